//! cli
//!
//! Command-line surface: argument definitions using clap derive, and the
//! runner that loops over target repositories.
//!
//! # Output
//!
//! On success the runner prints one JSON document to stdout:
//!
//! ```json
//! {
//!   "changed": true,
//!   "collaborators": {
//!     "acme/widget": [ { "login": "alice", ... } ]
//!   },
//!   "checks_ok": true
//! }
//! ```
//!
//! `changed` is true if any repository changed; `collaborators` is keyed by
//! the qualified `org/repo` path; `checks_ok` is omitted when no check
//! directives were supplied.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;

use crate::engine::reconcile;
use crate::host::github::GitHubSession;
use crate::model::{ChangeSet, RepoRef, Snapshot};
use crate::permission::PermissionLevel;

/// Reconcile direct collaborators and permissions on GitHub repositories.
#[derive(Parser, Debug)]
#[command(name = "collabsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Organization the repositories belong to
    #[arg(long)]
    pub org: String,

    /// Repository name within the organization (repeatable)
    #[arg(long = "repo", value_name = "NAME", required = true)]
    pub repos: Vec<String>,

    /// GitHub Enterprise API base, e.g. https://github.example.com/api/v3
    #[arg(long, value_name = "URL")]
    pub enterprise_url: Option<String>,

    /// Grant or overwrite a collaborator (repeatable)
    #[arg(long = "add", value_name = "LOGIN=LEVEL", value_parser = parse_directive)]
    pub add: Vec<(String, PermissionLevel)>,

    /// Revoke a collaborator's access entirely (repeatable)
    #[arg(long = "remove", value_name = "LOGIN")]
    pub remove: Vec<String>,

    /// Change the level of an existing collaborator (repeatable)
    #[arg(long = "change", value_name = "LOGIN=LEVEL", value_parser = parse_directive)]
    pub change: Vec<(String, PermissionLevel)>,

    /// Verify a collaborator's level without mutating (repeatable)
    #[arg(long = "check", value_name = "LOGIN=LEVEL", value_parser = parse_directive)]
    pub check: Vec<(String, PermissionLevel)>,

    /// Read state only; skip every mutation
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Assemble the directive sets from the repeated flags.
    pub fn change_set(&self) -> ChangeSet {
        ChangeSet {
            add: self.add.iter().cloned().collect(),
            remove: self.remove.iter().cloned().collect(),
            change: self.change.iter().cloned().collect(),
            check: self.check.iter().cloned().collect(),
        }
    }
}

/// Parse a `login=level` directive.
fn parse_directive(s: &str) -> Result<(String, PermissionLevel), String> {
    let (login, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LOGIN=LEVEL, got {:?}", s))?;
    if login.is_empty() {
        return Err(format!("empty login in {:?}", s));
    }
    let level: PermissionLevel = level.parse().map_err(|e| format!("{}", e))?;
    Ok((login.to_string(), level))
}

/// Aggregated result across all target repositories.
#[derive(Debug, Serialize)]
struct Report {
    changed: bool,
    collaborators: BTreeMap<String, Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checks_ok: Option<bool>,
}

/// Run a reconciliation over every `--repo` and print the JSON report.
///
/// Repositories are processed sequentially and independently; a failure on
/// one aborts the run, leaving earlier repositories in their already
/// reconciled state.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let directives = cli.change_set();

    let session = match &cli.enterprise_url {
        Some(base) => GitHubSession::with_api_base(&cli.token, base),
        None => GitHubSession::new(&cli.token),
    };

    let mut report = Report {
        changed: false,
        collaborators: BTreeMap::new(),
        checks_ok: None,
    };

    for name in &cli.repos {
        let Some(repo_ref) = RepoRef::parse(&format!("{}/{}", cli.org, name)) else {
            bail!("invalid repository name: {:?}", name);
        };
        let qualified = repo_ref.to_string();
        let host = session.repo(repo_ref);

        log::debug!("reconciling {}", qualified);
        let outcome = reconcile(&host, &directives, cli.dry_run)
            .await
            .with_context(|| format!("reconciling {}", qualified))?;

        report.changed |= outcome.changed;
        report.checks_ok = match (report.checks_ok, outcome.checks_ok) {
            (acc, None) => acc,
            (None, one) => one,
            (Some(acc), Some(one)) => Some(acc && one),
        };
        report.collaborators.insert(qualified, outcome.collaborators);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
