//! host
//!
//! Abstraction over the remote repository host.
//!
//! # Architecture
//!
//! The [`RepoHost`] trait defines the repository-scoped capability set the
//! reconciliation engine consumes: list direct collaborators, grant, revoke,
//! and query effective permission. The engine never constructs a session
//! itself; a handle is injected so tests can substitute [`mock::MockHost`]
//! for the real [`github::GitHubSession`].
//!
//! # Modules
//!
//! - `traits`: the `RepoHost` trait and `HostError`
//! - [`github`]: REST implementation, including enterprise base URLs
//! - [`mock`]: deterministic in-memory implementation for tests

pub mod github;
pub mod mock;
mod traits;

pub use traits::{HostError, RepoHost};
