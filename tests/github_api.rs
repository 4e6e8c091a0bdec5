//! Wiremock tests for the GitHub REST adapter.
//!
//! These pin the wire contract: direct-affiliation listing with pagination,
//! the grant request body, header shape, and the status-to-error mapping.

use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use collabsync::host::github::GitHubSession;
use collabsync::host::{HostError, RepoHost};
use collabsync::model::RepoRef;
use collabsync::permission::PermissionLevel;

const TOKEN: &str = "test-token";

async fn repo_against(server: &MockServer) -> collabsync::host::github::GitHubRepo {
    let session = GitHubSession::with_api_base(TOKEN, server.uri());
    session.repo(RepoRef::new("acme", "widget"))
}

fn collaborator_json(login: &str, id: u64, push: bool, admin: bool) -> Value {
    json!({
        "login": login,
        "id": id,
        "type": "User",
        "site_admin": false,
        "permissions": {
            "admin": admin,
            "maintain": false,
            "push": push,
            "triage": false,
            "pull": true
        }
    })
}

#[tokio::test]
async fn list_requests_direct_affiliation_with_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators"))
        .and(query_param("affiliation", "direct"))
        .and(query_param("per_page", "100"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(header("Accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            collaborator_json("alice", 1, true, false),
            collaborator_json("bob", 2, false, true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let snapshot = repo.list_direct_collaborators().await.unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].login, "alice");
    assert!(snapshot[0].permissions.push && !snapshot[0].permissions.admin);
    assert_eq!(snapshot[1].login, "bob");
    assert!(snapshot[1].permissions.admin);
}

#[tokio::test]
async fn list_paginates_until_a_short_page() {
    let server = MockServer::start().await;

    let full_page: Vec<Value> = (0..100)
        .map(|i| collaborator_json(&format!("user{}", i), i as u64 + 1, true, false))
        .collect();

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            collaborator_json("straggler", 101, false, false)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let snapshot = repo.list_direct_collaborators().await.unwrap();

    assert_eq!(snapshot.len(), 101);
    assert_eq!(snapshot.last().unwrap().login, "straggler");
}

#[tokio::test]
async fn grant_puts_permission_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/acme/widget/collaborators/alice"))
        .and(body_json(json!({ "permission": "push" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    repo.grant_collaborator("alice", PermissionLevel::Push)
        .await
        .unwrap();
}

#[tokio::test]
async fn grant_accepts_invitation_created() {
    let server = MockServer::start().await;

    // 201 means an invitation was created rather than updated in place.
    Mock::given(method("PUT"))
        .and(path("/repos/acme/widget/collaborators/newcomer"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 99 })))
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    repo.grant_collaborator("newcomer", PermissionLevel::Pull)
        .await
        .unwrap();
}

#[tokio::test]
async fn revoke_deletes_collaborator() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/widget/collaborators/bob"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    repo.revoke_collaborator("bob").await.unwrap();
}

#[tokio::test]
async fn effective_permission_uses_role_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators/alice/permission"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "permission": "write",
            "role_name": "push",
            "user": { "login": "alice" }
        })))
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let level = repo.effective_permission("alice").await.unwrap();
    assert_eq!(level, PermissionLevel::Push);
}

#[tokio::test]
async fn effective_permission_falls_back_to_legacy_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators/old/permission"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "permission": "read"
        })))
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let level = repo.effective_permission("old").await.unwrap();
    assert_eq!(level, PermissionLevel::Pull);
}

#[tokio::test]
async fn unauthorized_maps_to_auth_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let err = repo.list_direct_collaborators().await.unwrap_err();
    assert!(matches!(err, HostError::AuthFailed(_)));
}

#[tokio::test]
async fn missing_repo_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let err = repo.list_direct_collaborators().await.unwrap_err();
    match err {
        HostError::NotFound(msg) => assert_eq!(msg, "Not Found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/acme/widget/collaborators/alice"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "rate limited" })),
        )
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let err = repo
        .grant_collaborator("alice", PermissionLevel::Push)
        .await
        .unwrap_err();
    assert!(matches!(err, HostError::RateLimited));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/widget/collaborators/bob"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "message": "bad gateway" })))
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let err = repo.revoke_collaborator("bob").await.unwrap_err();
    match err {
        HostError::ApiError { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("bad gateway"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_reports_missing_scopes() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/acme/widget/collaborators/alice"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-Accepted-OAuth-Scopes", "repo")
                .set_body_json(json!({ "message": "Must have admin rights" })),
        )
        .mount(&server)
        .await;

    let repo = repo_against(&server).await;
    let err = repo
        .grant_collaborator("alice", PermissionLevel::Admin)
        .await
        .unwrap_err();
    match err {
        HostError::AuthFailed(msg) => {
            assert!(msg.contains("Must have admin rights"));
            assert!(msg.contains("repo"));
        }
        other => panic!("expected AuthFailed, got {other:?}"),
    }
}
