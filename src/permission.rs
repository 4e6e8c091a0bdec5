//! permission
//!
//! The closed vocabulary of repository permission levels.
//!
//! # Design
//!
//! GitHub exposes four discrete access tiers on a repository. They are not
//! linearly ordered here; the engine treats them as an enumerated capability
//! set with provider-defined semantics. Only a subset of the vocabulary is a
//! valid *grant* target: `triage` can be observed on a collaborator but the
//! collaborator API does not accept it through this engine, so grant and
//! change directives are validated against [`PermissionLevel::is_grantable`]
//! before any mutation is attempted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A repository permission level.
///
/// Serializes to the lowercase wire word GitHub uses (`"pull"`, `"push"`,
/// `"admin"`, `"triage"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read and clone the repository.
    Pull,
    /// Read, clone, and push to the repository.
    Push,
    /// Full control, including collaborator management.
    Admin,
    /// Issue/PR triage rights, no write access.
    Triage,
}

impl PermissionLevel {
    /// Whether this level is a valid target for a grant or change directive.
    ///
    /// Only `pull`, `push`, and `admin` may be granted; `triage` is a valid
    /// observed state but not a valid grant target.
    pub fn is_grantable(&self) -> bool {
        matches!(
            self,
            PermissionLevel::Pull | PermissionLevel::Push | PermissionLevel::Admin
        )
    }

    /// The wire word used in API request bodies and paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Pull => "pull",
            PermissionLevel::Push => "push",
            PermissionLevel::Admin => "admin",
            PermissionLevel::Triage => "triage",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pull" => Ok(PermissionLevel::Pull),
            "push" => Ok(PermissionLevel::Push),
            "admin" => Ok(PermissionLevel::Admin),
            "triage" => Ok(PermissionLevel::Triage),
            _ => Err(ParsePermissionError(s.to_string())),
        }
    }
}

/// Error returned when a string is not a known permission level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission level: {0:?} (expected pull, push, admin, or triage)")]
pub struct ParsePermissionError(pub String);

/// The four boolean permission flags carried by a collaborator record.
///
/// Field order matters: the `changed` flag compares serialized snapshots, so
/// this struct declares its fields in the order the provider record is
/// materialized (triage, push, pull, admin) and serde preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionMap {
    pub triage: bool,
    pub push: bool,
    pub pull: bool,
    pub admin: bool,
}

impl PermissionMap {
    /// Build the flag set implied by a single granted level.
    ///
    /// GitHub's tiers are cumulative for the grantable levels: `push`
    /// implies `pull`, `admin` implies both.
    pub fn from_level(level: PermissionLevel) -> Self {
        match level {
            PermissionLevel::Pull => PermissionMap {
                pull: true,
                ..Default::default()
            },
            PermissionLevel::Push => PermissionMap {
                push: true,
                pull: true,
                ..Default::default()
            },
            PermissionLevel::Admin => PermissionMap {
                push: true,
                pull: true,
                admin: true,
                ..Default::default()
            },
            PermissionLevel::Triage => PermissionMap {
                triage: true,
                pull: true,
                ..Default::default()
            },
        }
    }

    /// Whether the given level's flag is set.
    pub fn has(&self, level: PermissionLevel) -> bool {
        match level {
            PermissionLevel::Pull => self.pull,
            PermissionLevel::Push => self.push,
            PermissionLevel::Admin => self.admin,
            PermissionLevel::Triage => self.triage,
        }
    }

    /// The highest grant this flag set represents, used when reporting a
    /// collaborator's effective level.
    pub fn effective_level(&self) -> PermissionLevel {
        if self.admin {
            PermissionLevel::Admin
        } else if self.push {
            PermissionLevel::Push
        } else if self.triage {
            PermissionLevel::Triage
        } else {
            PermissionLevel::Pull
        }
    }
}
