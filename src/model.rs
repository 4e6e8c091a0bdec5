//! model
//!
//! Domain records for collaborator reconciliation.
//!
//! # Design
//!
//! The provider returns loosely-typed JSON records; they are mapped into the
//! statically-shaped structs here once per remote call, at the host boundary,
//! and never threaded through as opaque JSON. A [`Snapshot`] is the
//! materialized, point-in-time collaborator list for one repository; two
//! snapshots compare by serialized equality because that is the contract the
//! `changed` flag is defined against.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permission::{PermissionLevel, PermissionMap};

/// A direct collaborator on one repository, as materialized from the
/// provider at one point in time.
///
/// Identity key is `login`, case-sensitive as returned by the provider.
/// Records are rebuilt fresh on every read and never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub login: String,
    pub id: u64,
    /// Provider account type, e.g. `"User"` or `"Bot"`.
    #[serde(rename = "type")]
    pub account_type: String,
    pub site_admin: bool,
    pub permissions: PermissionMap,
}

/// A fully-qualified reference to one remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub org: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
        }
    }

    /// Parse an `org/name` qualified path.
    pub fn parse(qualified: &str) -> Option<Self> {
        let (org, name) = qualified.split_once('/')?;
        if org.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(org, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

/// Point-in-time collaborator list for one repository, in provider return
/// order.
pub type Snapshot = Vec<Collaborator>;

/// Compare two snapshots by serialized equality.
///
/// This mirrors the before/after comparison the `changed` flag is specified
/// against: field order and every field value participate. A serialization
/// failure is treated as a difference, which errs on the side of reporting a
/// change.
pub fn snapshot_eq(before: &Snapshot, after: &Snapshot) -> bool {
    match (serde_json::to_string(before), serde_json::to_string(after)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// The caller's reconciliation directives for one invocation.
///
/// The four sets are independent; a login may appear in more than one, and
/// the fixed execution order (add, remove, check, change) determines the
/// final observed state when they overlap. BTree collections keep the
/// per-set application order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Grant or overwrite: login to desired level.
    pub add: BTreeMap<String, PermissionLevel>,
    /// Revoke entirely.
    pub remove: BTreeSet<String>,
    /// Overwrite only for existing direct collaborators.
    pub change: BTreeMap<String, PermissionLevel>,
    /// Verify only; never mutates.
    pub check: BTreeMap<String, PermissionLevel>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty()
            && self.remove.is_empty()
            && self.change.is_empty()
            && self.check.is_empty()
    }
}
