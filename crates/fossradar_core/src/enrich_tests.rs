use super::*;
use std::fs;
use std::time::Duration;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECORD_WITH_FIELDS: &str = r#"slug = "widget"
name = "Widget"
short_desc = "A toolkit for building widgets in the terminal."
repo = "https://github.com/acme/widget"
license = "MIT"
added_at = "2024-03-01"

primary_lang = "Rust"
category = "devtools"
tags = ["cli"]
looking_for_contributors = true
location_city = "Bengaluru"
location_indian_state = "Karnataka"

good_first_issues = 0
stars = 0
verified = false
"#;

#[test]
fn test_rewrite_replaces_existing_fields() {
    let rewritten = rewrite_record_fields(RECORD_WITH_FIELDS, 250, 4, true, Some("Rust"));

    assert!(rewritten.contains("stars = 250\n"));
    assert!(rewritten.contains("good_first_issues = 4\n"));
    assert!(rewritten.contains("verified = true\n"));
    // Everything else is untouched.
    assert!(rewritten.contains("slug = \"widget\"\n"));
    assert!(rewritten.contains("looking_for_contributors = true\n"));
}

#[test]
fn test_rewrite_inserts_missing_block() {
    let record = r#"slug = "widget"
added_at = "2024-03-01"
primary_lang = "Go"
looking_for_contributors = true
location_city = "Pune"
"#;

    let rewritten = rewrite_record_fields(record, 12, 3, false, None);
    assert!(rewritten.contains(
        "looking_for_contributors = true\n\ngood_first_issues = 3\nstars = 12\nverified = false\n"
    ));
}

#[test]
fn test_rewrite_updates_primary_lang() {
    let rewritten = rewrite_record_fields(RECORD_WITH_FIELDS, 0, 0, false, Some("Zig"));
    assert!(rewritten.contains("primary_lang = \"Zig\"\n"));
    assert!(!rewritten.contains("primary_lang = \"Rust\""));
}

#[test]
fn test_rewrite_inserts_primary_lang_before_added_at() {
    let record = "slug = \"widget\"\nadded_at = \"2024-03-01\"\nstars = 0\n";
    let rewritten = rewrite_record_fields(record, 0, 0, false, Some("Rust"));
    assert!(rewritten.contains("primary_lang = \"Rust\"\nadded_at = \"2024-03-01\"\n"));
}

#[test]
fn test_rewrite_without_language_keeps_lang_line() {
    let rewritten = rewrite_record_fields(RECORD_WITH_FIELDS, 5, 0, false, None);
    assert!(rewritten.contains("primary_lang = \"Rust\"\n"));
}

#[test]
fn test_rewrite_is_idempotent() {
    let once = rewrite_record_fields(RECORD_WITH_FIELDS, 99, 2, true, Some("Rust"));
    let twice = rewrite_record_fields(&once, 99, 2, true, Some("Rust"));
    assert_eq!(once, twice);
}

fn github_client_for(mock_server: &MockServer) -> GitHubClient {
    let octocrab = octocrab::Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .build()
        .unwrap();
    GitHubClient::new(octocrab)
}

#[tokio::test]
async fn test_enrich_all_updates_record_and_writes_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stargazers_count": 321,
            "language": "Rust",
            "forks_count": 4,
            "subscribers_count": 2,
            "open_issues_count": 1,
            "size": 100,
            "default_branch": "main"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "number": 1 }])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "names": ["fossradar"] })))
        .mount(&mock_server)
        .await;
    let readme = "![v](https://img.shields.io/badge/fossradar.in-Verified-green)";
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": base64_encode(readme)
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "login": "asha",
                "avatar_url": "https://avatars.example/asha",
                "html_url": "https://github.com/asha",
                "contributions": 10
            }
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Cargo.toml", "type": "file" },
            { "name": "docs", "type": "dir" }
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Rust": 12345 })))
        .mount(&mock_server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let projects_dir = data_dir.path().join("projects");
    fs::create_dir_all(&projects_dir).unwrap();
    fs::write(projects_dir.join("widget.toml"), RECORD_WITH_FIELDS).unwrap();

    let store = ProjectStore::new(&projects_dir);
    let client = github_client_for(&mock_server);
    let cache_dir = data_dir.path().join("cache");
    let enricher =
        Enricher::new(&client, &store, &cache_dir).with_pause(Duration::from_secs(0));

    let outcomes = enricher.enrich_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert!(outcome.updated);
    assert_eq!(outcome.stars, 321);
    assert_eq!(outcome.good_first_issues, 1);
    assert!(outcome.verified);
    assert_eq!(outcome.contributors, 1);

    let record = fs::read_to_string(projects_dir.join("widget.toml")).unwrap();
    assert!(record.contains("stars = 321\n"));
    assert!(record.contains("good_first_issues = 1\n"));
    assert!(record.contains("verified = true\n"));

    let cache: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(cache_dir.join("widget.json")).unwrap()).unwrap();
    assert_eq!(cache["slug"], "widget");
    assert_eq!(cache["contributors"][0]["login"], "asha");
    assert_eq!(cache["installation"]["type"], "cargo");
    assert_eq!(cache["languages"]["Rust"], 12345);
    assert_eq!(cache["stats"]["forks"], 4);
}

#[tokio::test]
async fn test_enrich_all_skips_unreachable_repository() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&mock_server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let projects_dir = data_dir.path().join("projects");
    fs::create_dir_all(&projects_dir).unwrap();
    fs::write(projects_dir.join("widget.toml"), RECORD_WITH_FIELDS).unwrap();

    let store = ProjectStore::new(&projects_dir);
    let client = github_client_for(&mock_server);
    let enricher = Enricher::new(&client, &store, data_dir.path().join("cache"))
        .with_pause(Duration::from_secs(0));

    let outcomes = enricher.enrich_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].updated);
    assert!(outcomes[0].error.is_some());

    // The record is untouched.
    let record = fs::read_to_string(projects_dir.join("widget.toml")).unwrap();
    assert_eq!(record, RECORD_WITH_FIELDS);
}

fn base64_encode(text: &str) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}
