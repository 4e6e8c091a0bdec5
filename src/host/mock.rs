//! host::mock
//!
//! In-memory host implementation for deterministic testing.
//!
//! # Design
//!
//! The mock stores one repository's collaborator list in memory, preserving
//! insertion order the way the provider preserves listing order. Failure
//! scenarios are configured per method via [`FailOn`], and every call is
//! recorded for verification.
//!
//! # Example
//!
//! ```
//! use collabsync::host::mock::MockHost;
//! use collabsync::host::RepoHost;
//! use collabsync::permission::PermissionLevel;
//!
//! # tokio_test::block_on(async {
//! let host = MockHost::new();
//! host.grant_collaborator("alice", PermissionLevel::Push).await.unwrap();
//!
//! let snapshot = host.list_direct_collaborators().await.unwrap();
//! assert_eq!(snapshot.len(), 1);
//! assert!(snapshot[0].permissions.push);
//! # });
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{HostError, RepoHost};
use crate::model::Collaborator;
use crate::permission::{PermissionLevel, PermissionMap};

/// Mock host for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockHost {
    inner: Arc<Mutex<MockHostInner>>,
}

#[derive(Debug)]
struct MockHostInner {
    /// Collaborators in listing order.
    collaborators: Vec<Collaborator>,
    /// Next id to assign to a newly created collaborator.
    next_id: u64,
    /// Simulates a repository that does not resolve.
    missing: bool,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<HostOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_direct_collaborators with the given error.
    List(HostError),
    /// Fail grant_collaborator with the given error.
    Grant(HostError),
    /// Fail revoke_collaborator with the given error.
    Revoke(HostError),
    /// Fail effective_permission with the given error.
    Permission(HostError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOperation {
    List,
    Grant { login: String, level: PermissionLevel },
    Revoke { login: String },
    Permission { login: String },
}

impl MockHost {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockHostInner {
                collaborators: Vec::new(),
                next_id: 1,
                missing: false,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Create a mock repository with pre-existing collaborators.
    pub fn with_collaborators(collaborators: Vec<Collaborator>) -> Self {
        let next_id = collaborators.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Mutex::new(MockHostInner {
                collaborators,
                next_id,
                missing: false,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Shorthand: a collaborator with the flags implied by one granted level.
    pub fn collaborator(login: &str, id: u64, level: PermissionLevel) -> Collaborator {
        Collaborator {
            login: login.to_string(),
            id,
            account_type: "User".to_string(),
            site_admin: false,
            permissions: PermissionMap::from_level(level),
        }
    }

    /// Create a mock for a repository that does not resolve.
    ///
    /// Every operation returns `HostError::NotFound`.
    pub fn missing_repo() -> Self {
        let host = Self::new();
        host.inner.lock().unwrap().missing = true;
        host
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<HostOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Current collaborator list without going through the trait (and
    /// without being recorded).
    pub fn collaborators_sync(&self) -> Vec<Collaborator> {
        let inner = self.inner.lock().unwrap();
        inner.collaborators.clone()
    }

    fn record(&self, op: HostOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    fn check_fail<T>(&self, expected: &str) -> Option<Result<T, HostError>> {
        let inner = self.inner.lock().unwrap();
        if inner.missing {
            return Some(Err(HostError::NotFound("repository not found".into())));
        }
        match &inner.fail_on {
            Some(FailOn::List(e)) if expected == "list" => Some(Err(e.clone())),
            Some(FailOn::Grant(e)) if expected == "grant" => Some(Err(e.clone())),
            Some(FailOn::Revoke(e)) if expected == "revoke" => Some(Err(e.clone())),
            Some(FailOn::Permission(e)) if expected == "permission" => Some(Err(e.clone())),
            _ => None,
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoHost for MockHost {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_direct_collaborators(&self) -> Result<Vec<Collaborator>, HostError> {
        self.record(HostOperation::List);

        if let Some(result) = self.check_fail("list") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner.collaborators.clone())
    }

    async fn grant_collaborator(
        &self,
        login: &str,
        level: PermissionLevel,
    ) -> Result<(), HostError> {
        self.record(HostOperation::Grant {
            login: login.to_string(),
            level,
        });

        if let Some(result) = self.check_fail::<()>("grant") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.collaborators.iter_mut().find(|c| c.login == login) {
            // Overwrite in place; listing position is preserved.
            existing.permissions = PermissionMap::from_level(level);
        } else {
            let id = inner.next_id;
            inner.next_id += 1;
            let collaborator = Collaborator {
                login: login.to_string(),
                id,
                account_type: "User".to_string(),
                site_admin: false,
                permissions: PermissionMap::from_level(level),
            };
            inner.collaborators.push(collaborator);
        }
        Ok(())
    }

    async fn revoke_collaborator(&self, login: &str) -> Result<(), HostError> {
        self.record(HostOperation::Revoke {
            login: login.to_string(),
        });

        if let Some(result) = self.check_fail::<()>("revoke") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        match inner.collaborators.iter().position(|c| c.login == login) {
            Some(idx) => {
                inner.collaborators.remove(idx);
                Ok(())
            }
            None => Err(HostError::NotFound(format!("not a collaborator: {}", login))),
        }
    }

    async fn effective_permission(&self, login: &str) -> Result<PermissionLevel, HostError> {
        self.record(HostOperation::Permission {
            login: login.to_string(),
        });

        if let Some(result) = self.check_fail("permission") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        inner
            .collaborators
            .iter()
            .find(|c| c.login == login)
            .map(|c| c.permissions.effective_level())
            .ok_or_else(|| HostError::NotFound(format!("not a collaborator: {}", login)))
    }
}
