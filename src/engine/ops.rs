//! engine::ops
//!
//! The four reconciliation operations: add, remove, check, change.
//!
//! # Design
//!
//! Every operation takes an injected [`RepoHost`] handle and is scoped to
//! that one repository. Mutating operations issue blocking remote calls in
//! deterministic directive order and perform no retries; a remote failure
//! surfaces immediately except in [`apply_adds`], whose per-login failures
//! are independent and therefore aggregated (see below).

use std::collections::{BTreeMap, BTreeSet};

use crate::host::{HostError, RepoHost};
use crate::permission::PermissionLevel;

use super::SyncError;

/// Validate every grant directive against the permission vocabulary.
///
/// All-or-nothing: the first non-grantable level aborts with
/// [`SyncError::InvalidPermission`] naming the offending login, before any
/// mutation is attempted.
pub fn validate_grants(directives: &BTreeMap<String, PermissionLevel>) -> Result<(), SyncError> {
    for (login, level) in directives {
        if !level.is_grantable() {
            return Err(SyncError::InvalidPermission {
                login: login.clone(),
                level: level.to_string(),
            });
        }
    }
    Ok(())
}

/// Grant each (login, level) pair, creating the collaborator relationship
/// if absent and overwriting it if present.
///
/// Partial-failure policy: grants for distinct logins are independent, so a
/// failed grant does not stop the remaining ones; the failures are
/// aggregated into a single [`SyncError::Provider`] naming each login.
/// Auth failures are the exception and abort immediately, since every
/// remaining call would be rejected the same way.
pub async fn apply_adds(
    host: &dyn RepoHost,
    to_add: &BTreeMap<String, PermissionLevel>,
) -> Result<(), SyncError> {
    let mut failures: Vec<String> = Vec::new();

    for (login, level) in to_add {
        match host.grant_collaborator(login, *level).await {
            Ok(()) => {}
            Err(e @ (HostError::AuthRequired | HostError::AuthFailed(_))) => {
                return Err(e.into());
            }
            Err(e) => {
                log::warn!("grant failed for {}: {}", login, e);
                failures.push(format!("{}: {}", login, e));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Provider(format!(
            "grant failed for {} collaborator(s): {}",
            failures.len(),
            failures.join("; ")
        )))
    }
}

/// Revoke access for each login in `to_remove` that is currently a direct
/// collaborator.
///
/// Idempotent: logins that are not current collaborators are silently
/// skipped, so removing an already-absent login is not an error.
pub async fn apply_removes(
    host: &dyn RepoHost,
    to_remove: &BTreeSet<String>,
) -> Result<(), SyncError> {
    let current = host.list_direct_collaborators().await?;

    for collaborator in &current {
        if to_remove.contains(&collaborator.login) {
            host.revoke_collaborator(&collaborator.login).await?;
        }
    }
    Ok(())
}

/// Check each (login, expected level) pair against the host's reported
/// effective permission.
///
/// Returns true only if every pair matches exactly. Performs no mutation.
/// A login the host cannot resolve a permission for counts as a mismatch,
/// not an error; other host failures propagate.
pub async fn verify(
    host: &dyn RepoHost,
    to_check: &BTreeMap<String, PermissionLevel>,
) -> Result<bool, SyncError> {
    let mut all_match = true;

    for (login, expected) in to_check {
        match host.effective_permission(login).await {
            Ok(actual) if actual == *expected => {}
            Ok(actual) => {
                log::debug!(
                    "permission mismatch for {}: expected {}, host reports {}",
                    login,
                    expected,
                    actual
                );
                all_match = false;
            }
            Err(HostError::NotFound(_)) => {
                log::debug!("permission check: {} has no permission on repository", login);
                all_match = false;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(all_match)
}

/// Re-grant each (login, level) pair in `to_change` whose login is already
/// a direct collaborator.
///
/// Never creates new collaborator relationships: pairs for logins outside
/// the current membership set are silently skipped.
pub async fn apply_changes(
    host: &dyn RepoHost,
    to_change: &BTreeMap<String, PermissionLevel>,
) -> Result<(), SyncError> {
    let members: BTreeSet<String> = host
        .list_direct_collaborators()
        .await?
        .into_iter()
        .map(|c| c.login)
        .collect();

    for (login, level) in to_change {
        if members.contains(login) {
            host.grant_collaborator(login, *level).await?;
        }
    }
    Ok(())
}
