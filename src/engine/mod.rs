//! engine
//!
//! The reconciliation engine: validation, the four operations in fixed
//! order, and the before/after diff.
//!
//! # Sequencing
//!
//! One invocation over one repository runs:
//!
//! 1. capture the `before` snapshot
//! 2. validate every add directive against the permission vocabulary
//!    (all-or-nothing, before any write)
//! 3. add, remove, check, change — each skipped when its directive set is
//!    empty; no remote call is made for an unsupplied directive
//! 4. capture the `after` snapshot
//! 5. `changed` = serialized(before) != serialized(after)
//!
//! Under dry-run, only the read in step 1 happens; the mutating steps are
//! skipped entirely and `after` reuses `before`. Check still runs since it
//! never mutates.
//!
//! # Error policy
//!
//! Remote failures propagate unmodified; nothing is swallowed or
//! downgraded, and completed mutation steps are not rolled back when a
//! later step fails. Partial application up to the failing step is the
//! documented behavior.

pub mod ops;

use serde::Serialize;
use thiserror::Error;

use crate::host::{HostError, RepoHost};
use crate::model::{snapshot_eq, ChangeSet, Snapshot};

/// Errors from a reconciliation invocation.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// A grant directive carries a level outside {pull, push, admin}.
    /// Caught before any mutation; the invocation has zero side effects.
    #[error("invalid permission {level:?} for {login}: permissions must be pull, push, or admin")]
    InvalidPermission { login: String, level: String },

    /// The credential was rejected by the provider.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The organization or repository does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient or unspecified remote failure. Not retried; the repository
    /// is left in whatever partial state the completed steps produced.
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<HostError> for SyncError {
    fn from(e: HostError) -> Self {
        match e {
            HostError::AuthRequired => SyncError::Auth("authentication required".into()),
            HostError::AuthFailed(msg) => SyncError::Auth(msg),
            HostError::NotFound(msg) => SyncError::NotFound(msg),
            other => SyncError::Provider(other.to_string()),
        }
    }
}

/// Result of one reconciliation invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// Whether the before and after snapshots differ (serialized comparison).
    pub changed: bool,
    /// The repository's direct collaborators after all operations ran.
    pub collaborators: Snapshot,
    /// Outcome of the check directives: `None` when none were supplied,
    /// otherwise whether every checked pair matched exactly. Advisory; a
    /// failed check never fails the invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks_ok: Option<bool>,
}

/// Reconcile one repository's direct collaborators against the caller's
/// directives.
///
/// Each directive set is optional and independently skippable; the fixed
/// execution order (add, remove, check, change) determines the final state
/// when a login appears in more than one set. With `dry_run` set, no
/// mutation is issued and `changed` is always false.
pub async fn reconcile(
    host: &dyn RepoHost,
    directives: &ChangeSet,
    dry_run: bool,
) -> Result<SyncOutcome, SyncError> {
    let before = host.list_direct_collaborators().await?;

    // Validation precedes every write, even under dry-run, so a bad
    // directive is reported identically in both modes.
    if !directives.add.is_empty() {
        ops::validate_grants(&directives.add)?;
    }

    if !dry_run {
        if !directives.add.is_empty() {
            log::debug!("granting {} collaborator(s)", directives.add.len());
            ops::apply_adds(host, &directives.add).await?;
        }
        if !directives.remove.is_empty() {
            log::debug!("revoking up to {} collaborator(s)", directives.remove.len());
            ops::apply_removes(host, &directives.remove).await?;
        }
    }

    let checks_ok = if directives.check.is_empty() {
        None
    } else {
        let ok = ops::verify(host, &directives.check).await?;
        if !ok {
            log::warn!(
                "permission check failed: at least one collaborator differs from the expected level"
            );
        }
        Some(ok)
    };

    if !dry_run && !directives.change.is_empty() {
        log::debug!("retargeting {} collaborator(s)", directives.change.len());
        ops::apply_changes(host, &directives.change).await?;
    }

    let after = if dry_run {
        before.clone()
    } else {
        host.list_direct_collaborators().await?
    };

    Ok(SyncOutcome {
        changed: !snapshot_eq(&before, &after),
        collaborators: after,
        checks_ok,
    })
}
