//! Unit tests for the github_client crate.

use super::*; // Import items from lib.rs
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate}; // For constructing mock bodies

async fn client_for(mock_server: &MockServer) -> GitHubClient {
    let octocrab = octocrab::Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();
    GitHubClient { client: octocrab }
}

#[tokio::test]
async fn test_get_repository_maps_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "widget",
            "stargazers_count": 321,
            "language": "Rust",
            "description": "Widgets for terminals",
            "homepage": "https://widget.example.org",
            "license": { "spdx_id": "MIT" },
            "forks_count": 12,
            "subscribers_count": 7,
            "open_issues_count": 3,
            "size": 2048,
            "default_branch": "trunk",
            "topics": ["fossradar", "tui"],
            "has_wiki": true,
            "has_pages": false,
            "has_discussions": true,
            "archived": false,
            "private": false
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let meta = client.get_repository("acme", "widget").await.unwrap();

    assert_eq!(meta.stars, 321);
    assert_eq!(meta.language.as_deref(), Some("Rust"));
    assert_eq!(meta.license.as_deref(), Some("MIT"));
    assert_eq!(meta.default_branch, "trunk");
    assert_eq!(meta.topics, vec!["fossradar", "tui"]);
    assert!(!meta.private);
}

#[tokio::test]
async fn test_get_repository_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let result = client.get_repository("acme", "missing").await;

    assert!(matches!(result, Err(Error::NotFound)));
    assert!(!client.is_repo_accessible("acme", "missing").await);
}

#[tokio::test]
async fn test_private_repository_is_not_accessible() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "secret",
            "private": true
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(!client.is_repo_accessible("acme", "secret").await);
}

#[tokio::test]
async fn test_has_topic_is_case_insensitive_exact_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "names": ["FOSSRadar", "rust"]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(client.has_topic("acme", "widget", "fossradar").await.unwrap());
    assert!(!client.has_topic("acme", "widget", "fossradar-in").await.unwrap());
}

#[tokio::test]
async fn test_get_readme_decodes_base64() {
    let mock_server = MockServer::start().await;

    // "# Widget\n" base64-encoded with a line wrap, as GitHub returns it.
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": "IyBXaWRn\nZXQK",
            "encoding": "base64"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let readme = client.get_readme("acme", "widget").await.unwrap();
    assert_eq!(readme.as_deref(), Some("# Widget\n"));
}

#[tokio::test]
async fn test_get_readme_missing_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/readme"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert_eq!(client.get_readme("acme", "widget").await.unwrap(), None);
    assert!(!client.has_verified_badge("acme", "widget").await.unwrap());
}

#[tokio::test]
async fn test_has_verified_badge_matches_case_insensitively() {
    let mock_server = MockServer::start().await;

    let readme = "# Widget\n\n![Verified](https://img.shields.io/badge/FOSSRadar.in-Verified-green)\n";
    let encoded = base64::engine::general_purpose::STANDARD.encode(readme.as_bytes());

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": encoded,
            "encoding": "base64"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(client.has_verified_badge("acme", "widget").await.unwrap());
}

#[tokio::test]
async fn test_count_good_first_issues_excludes_pull_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/issues"))
        .and(query_param("labels", "good first issue"))
        .and(query_param("state", "open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 1 },
            { "number": 2, "pull_request": { "url": "https://api.github.com/..." } },
            { "number": 3 }
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert_eq!(client.count_good_first_issues("acme", "widget").await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_contributors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "login": "asha",
                "avatar_url": "https://avatars.example/asha",
                "html_url": "https://github.com/asha",
                "contributions": 42
            },
            { "contributions": 1 }
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let contributors = client.list_contributors("acme", "widget", 10).await.unwrap();

    assert_eq!(contributors.len(), 2);
    assert_eq!(contributors[0].login, "asha");
    assert_eq!(contributors[1].login, "anonymous");
}

#[tokio::test]
async fn test_detect_installation_prefers_cargo_over_git() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Cargo.toml", "type": "file" },
            { "name": "src", "type": "dir" }
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let install = client.detect_installation("acme", "widget").await.unwrap();

    assert_eq!(install.kind, "cargo");
    assert_eq!(install.command, "cargo install widget");
}

#[tokio::test]
async fn test_detect_installation_falls_back_to_git_clone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "README.md", "type": "file" }
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let install = client.detect_installation("acme", "widget").await.unwrap();

    assert_eq!(install.kind, "git");
    assert_eq!(install.command, "git clone https://github.com/acme/widget");
}

#[tokio::test]
async fn test_find_documentation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Docs", "type": "dir" },
            { "name": "CHANGELOG.md", "type": "file" },
            { "name": "changelog-old.txt", "type": "file" }
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let links = client.find_documentation("acme", "widget").await.unwrap();

    assert_eq!(
        links.docs_url.as_deref(),
        Some("https://github.com/acme/widget/tree/main/Docs")
    );
    assert_eq!(
        links.changelog_url.as_deref(),
        Some("https://github.com/acme/widget/blob/main/CHANGELOG.md")
    );
}

#[tokio::test]
async fn test_is_starred_reads_status_codes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/starred/acme/widget"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/starred/acme/other"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(client.is_starred("acme", "widget").await.unwrap());
    assert!(!client.is_starred("acme", "other").await.unwrap());
}

#[tokio::test]
async fn test_list_user_repositories_filters_forks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "widget",
                "full_name": "asha/widget",
                "html_url": "https://github.com/asha/widget",
                "description": "mine",
                "stargazers_count": 5,
                "forks_count": 1,
                "language": "Rust",
                "private": false,
                "fork": false
            },
            {
                "name": "forked",
                "full_name": "asha/forked",
                "html_url": "https://github.com/asha/forked",
                "description": null,
                "language": null,
                "private": false,
                "fork": true
            }
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let repos = client.list_user_repositories().await.unwrap();

    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].full_name, "asha/widget");
}

#[tokio::test]
async fn test_affiliation_checks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "widget",
            "owner": { "login": "Acme", "type": "Organization" }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/memberships/asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "active" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/memberships/ravi"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/collaborators/asha/permission"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "permission": "write" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    assert!(client.is_repo_owner("acme", "widget", "acme").await.unwrap());
    assert!(client.is_org_owned("acme", "widget").await.unwrap());
    assert!(client.is_org_member("acme", "asha").await.unwrap());
    assert!(!client.is_org_member("acme", "ravi").await.unwrap());
    assert!(client.has_write_access("acme", "widget", "asha").await.unwrap());
}

#[tokio::test]
async fn test_forbidden_with_rate_limit_message_maps_to_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "API rate limit exceeded for 1.2.3.4"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let result = client.get_repository("acme", "widget").await;

    assert!(matches!(result, Err(Error::RateLimitExceeded)));
}
