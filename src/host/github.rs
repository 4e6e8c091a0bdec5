//! host::github
//!
//! GitHub implementation of [`RepoHost`] over the REST API.
//!
//! # Design
//!
//! A [`GitHubSession`] holds the HTTP client, credential, and API base URL
//! (configurable for GitHub Enterprise deployments, which serve the API
//! under `https://github.<domain>/api/v3`). Calling [`GitHubSession::repo`]
//! scopes the session to one repository and yields a [`GitHubRepo`], which
//! implements the host trait.
//!
//! # Rate limiting and retries
//!
//! GitHub has rate limits. This layer returns `HostError::RateLimited` when
//! they are hit and performs no retries of any kind; retry policy belongs to
//! the caller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{HostError, RepoHost};
use crate::model::{Collaborator, RepoRef};
use crate::permission::{PermissionLevel, PermissionMap};

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "collabsync";

/// Page size for list endpoints (GitHub's maximum).
const PER_PAGE: u32 = 100;

/// An authenticated GitHub API session.
///
/// Construct once from a token (and optionally an enterprise base URL),
/// then scope it to repositories with [`repo`](GitHubSession::repo).
#[derive(Clone)]
pub struct GitHubSession {
    client: Client,
    token: String,
    api_base: String,
}

// Custom Debug to avoid exposing the token.
impl std::fmt::Debug for GitHubSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSession")
            .field("has_token", &!self.token.is_empty())
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubSession {
    /// Create a session against github.com.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a session against a custom API base URL.
    ///
    /// Use this for GitHub Enterprise, e.g.
    /// `https://github.example.com/api/v3`.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            api_base: api_base.into(),
        }
    }

    /// Scope this session to one repository.
    pub fn repo(&self, repo_ref: RepoRef) -> GitHubRepo {
        GitHubRepo {
            session: self.clone(),
            repo_ref,
        }
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, HostError> {
        if self.token.is_empty() {
            return Err(HostError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| HostError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }
}

/// A session scoped to one repository; implements [`RepoHost`].
#[derive(Debug, Clone)]
pub struct GitHubRepo {
    session: GitHubSession,
    repo_ref: RepoRef,
}

impl GitHubRepo {
    /// The repository this handle is scoped to.
    pub fn repo_ref(&self) -> &RepoRef {
        &self.repo_ref
    }

    /// Build a URL under this repository.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.session.api_base, self.repo_ref.org, self.repo_ref.name, path
        )
    }

    /// Parse a successful response body, or map the error response.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, HostError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| HostError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Map an error response onto [`HostError`].
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, HostError> {
        // Classic OAuth advertises missing scopes in a response header.
        let required_scopes = response
            .headers()
            .get("X-Accepted-OAuth-Scopes")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => HostError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(scopes) = required_scopes {
                    if !scopes.is_empty() {
                        err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                    }
                }
                HostError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => HostError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => HostError::RateLimited,
            _ if status.is_server_error() => HostError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => HostError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl RepoHost for GitHubRepo {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_direct_collaborators(&self) -> Result<Vec<Collaborator>, HostError> {
        let mut collaborators = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = format!(
                "{}?affiliation=direct&per_page={}&page={}",
                self.repo_url("collaborators"),
                PER_PAGE,
                page
            );

            let response = self
                .session
                .client
                .get(&url)
                .headers(self.session.headers()?)
                .send()
                .await
                .map_err(|e| HostError::NetworkError(e.to_string()))?;

            let page_items: Vec<GitHubCollaborator> = self.handle_response(response).await?;
            let page_count = page_items.len();
            collaborators.extend(page_items.into_iter().map(Into::into));

            if page_count < PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(collaborators)
    }

    async fn grant_collaborator(
        &self,
        login: &str,
        level: PermissionLevel,
    ) -> Result<(), HostError> {
        let url = self.repo_url(&format!("collaborators/{}", login));
        let body = GrantBody {
            permission: level.as_str(),
        };

        let response = self
            .session
            .client
            .put(&url)
            .headers(self.session.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| HostError::NetworkError(e.to_string()))?;

        // 201 = invitation created, 204 = permission updated in place.
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }

    async fn revoke_collaborator(&self, login: &str) -> Result<(), HostError> {
        let url = self.repo_url(&format!("collaborators/{}", login));

        let response = self
            .session
            .client
            .delete(&url)
            .headers(self.session.headers()?)
            .send()
            .await
            .map_err(|e| HostError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }

    async fn effective_permission(&self, login: &str) -> Result<PermissionLevel, HostError> {
        let url = self.repo_url(&format!("collaborators/{}/permission", login));

        let response = self
            .session
            .client
            .get(&url)
            .headers(self.session.headers()?)
            .send()
            .await
            .map_err(|e| HostError::NetworkError(e.to_string()))?;

        let reply: PermissionReply = self.handle_response(response).await?;
        decode_permission(&reply)
    }
}

/// Decode GitHub's permission reply into the vocabulary.
///
/// Newer API versions return `role_name` with the tier word directly; older
/// ones only return the legacy `permission` field, whose values need
/// translation (write is push, read is pull).
fn decode_permission(reply: &PermissionReply) -> Result<PermissionLevel, HostError> {
    if let Some(role) = &reply.role_name {
        if let Ok(level) = role.parse() {
            return Ok(level);
        }
    }
    match reply.permission.as_str() {
        "admin" => Ok(PermissionLevel::Admin),
        "write" => Ok(PermissionLevel::Push),
        "read" => Ok(PermissionLevel::Pull),
        "triage" => Ok(PermissionLevel::Triage),
        "none" => Err(HostError::NotFound("no permission on repository".into())),
        other => Err(HostError::ApiError {
            status: 200,
            message: format!("unrecognized permission level in reply: {}", other),
        }),
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for granting or updating a collaborator.
#[derive(Serialize)]
struct GrantBody<'a> {
    permission: &'a str,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Collaborator list item as returned by the REST API.
#[derive(Deserialize)]
struct GitHubCollaborator {
    login: String,
    id: u64,
    #[serde(rename = "type")]
    account_type: String,
    site_admin: bool,
    permissions: GitHubPermissions,
}

/// Per-collaborator permission flags on the wire.
///
/// `triage` is absent on some enterprise versions; default it to false.
#[derive(Deserialize)]
struct GitHubPermissions {
    #[serde(default)]
    triage: bool,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    pull: bool,
    #[serde(default)]
    admin: bool,
}

/// Reply from the collaborator permission endpoint.
#[derive(Deserialize)]
struct PermissionReply {
    permission: String,
    #[serde(default)]
    role_name: Option<String>,
}

impl From<GitHubCollaborator> for Collaborator {
    fn from(c: GitHubCollaborator) -> Self {
        Collaborator {
            login: c.login,
            id: c.id,
            account_type: c.account_type,
            site_admin: c.site_admin,
            permissions: PermissionMap {
                triage: c.permissions.triage,
                push: c.permissions.push,
                pull: c.permissions.pull,
                admin: c.permissions.admin,
            },
        }
    }
}
