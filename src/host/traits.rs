//! host::traits
//!
//! Repository-host trait for collaborator operations.
//!
//! # Design
//!
//! `RepoHost` is async because every operation is a remote call. A host
//! value is scoped to one repository: the engine takes a handle, never an
//! ambient global session, so a fake transport can stand in during tests.
//! This layer performs no retries; a single remote failure surfaces
//! immediately and the caller decides what to do with the partial state.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Collaborator;
use crate::permission::PermissionLevel;

/// Errors from repository-host operations.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// Authentication is required but no credential was supplied.
    #[error("authentication required")]
    AuthRequired,

    /// The credential was rejected or lacks the needed permissions.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The repository or user does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// The API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Repository-scoped collaborator operations on a remote host.
///
/// Implementations must be `Send + Sync` so a handle can be shared across
/// async tasks. All methods are single remote calls with no retry layer.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Host name, e.g. `"github"` or `"mock"`.
    fn name(&self) -> &'static str;

    /// List collaborators with *direct* affiliation only.
    ///
    /// Access inherited through teams or organization-wide membership is
    /// deliberately excluded so the engine never reports or mutates it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the repository does not resolve
    /// - `AuthFailed` if the credential is rejected
    async fn list_direct_collaborators(&self) -> Result<Vec<Collaborator>, HostError>;

    /// Set `login`'s permission to `level`, creating the collaborator
    /// relationship if absent and overwriting it if present.
    async fn grant_collaborator(
        &self,
        login: &str,
        level: PermissionLevel,
    ) -> Result<(), HostError>;

    /// Revoke `login`'s direct access entirely.
    async fn revoke_collaborator(&self, login: &str) -> Result<(), HostError>;

    /// The effective permission level the host reports for `login`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no resolvable permission on the repo
    async fn effective_permission(&self, login: &str) -> Result<PermissionLevel, HostError>;
}
