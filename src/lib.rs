//! Collabsync - reconcile direct collaborators on GitHub repositories
//!
//! Collabsync compares a caller-supplied desired state (grants, revocations,
//! level changes, verifications) against the live collaborator list of one or
//! more repositories and applies the minimal set of mutations, reporting a
//! before/after `changed` signal downstream automation can act on.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Validation, the four reconciliation operations, and the diff
//! - [`model`] - Domain records: collaborators, snapshots, directive sets
//! - [`permission`] - The closed permission vocabulary
//! - [`host`] - Abstraction over the remote repository host (GitHub v1)
//!
//! # Scope
//!
//! Only *direct* per-repository collaborator grants are managed. Access
//! inherited through teams or organization-wide roles is never reported or
//! mutated. There is no retry layer and no rollback: errors surface
//! immediately and already-applied operations stay applied.

pub mod cli;
pub mod engine;
pub mod host;
pub mod model;
pub mod permission;
