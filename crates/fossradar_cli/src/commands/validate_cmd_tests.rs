use super::*;
use std::fs;
use tempfile::TempDir;

use project_store::{parse_project_str, ProjectStore};

const RECORD: &str = r#"slug = "widget"
name = "Widget"
short_desc = "A toolkit for building widgets in the terminal."
repo = "https://github.com/acme/widget"
license = "MIT"
logo = "/logos/widget.svg"
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

fn fixture(dir: &TempDir) -> (CliConfig, Allowlists, StoredProject) {
    fs::write(
        dir.path().join("tags.toml"),
        r#"tags = ["cli", "tui"]"#,
    )
    .expect("write tags");
    fs::write(
        dir.path().join("licenses-osi.json"),
        r#"{"licenses": ["MIT", "Apache-2.0"]}"#,
    )
    .expect("write licenses");
    fs::write(
        dir.path().join("categories.json"),
        r#"{
            "categories": {
                "devtools": {"label": "Developer Tools", "description": "Tooling", "icon": "wrench"}
            }
        }"#,
    )
    .expect("write categories");

    let public_dir = dir.path().join("public");
    fs::create_dir_all(public_dir.join("logos")).expect("logos dir");

    let config = CliConfig {
        data_dir: dir.path().to_path_buf(),
        public_dir,
        cache_dir: dir.path().join("cache"),
        db_path: dir.path().join("visitors.db"),
        github_token: None,
    };
    let allowlists = Allowlists::load(dir.path()).expect("allowlists");
    let project = parse_project_str(RECORD, "widget.toml").expect("parse record");
    let stored = StoredProject {
        project,
        filename: "widget.toml".to_string(),
    };
    (config, allowlists, stored)
}

#[test]
fn test_clean_record_with_logo_on_disk() {
    let dir = TempDir::new().expect("tempdir");
    let (config, allowlists, stored) = fixture(&dir);
    fs::write(config.public_dir.join("logos/widget.svg"), "<svg/>").expect("write logo");

    let mut report = ValidationReport::default();
    check_record(&mut report, &allowlists, &config, &stored);

    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_missing_logo_file_is_a_warning() {
    let dir = TempDir::new().expect("tempdir");
    let (config, allowlists, stored) = fixture(&dir);

    let mut report = ValidationReport::default();
    check_record(&mut report, &allowlists, &config, &stored);

    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("does not exist"));
}

#[test]
fn test_oversized_logo_is_a_warning() {
    let dir = TempDir::new().expect("tempdir");
    let (config, allowlists, stored) = fixture(&dir);
    let big = vec![b'x'; (MAX_LOGO_BYTES + 1) as usize];
    fs::write(config.public_dir.join("logos/widget.svg"), big).expect("write logo");

    let mut report = ValidationReport::default();
    check_record(&mut report, &allowlists, &config, &stored);

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("KiB"));
}

#[test]
fn test_allowlist_violations_are_errors() {
    let dir = TempDir::new().expect("tempdir");
    let (config, allowlists, mut stored) = fixture(&dir);
    fs::write(config.public_dir.join("logos/widget.svg"), "<svg/>").expect("write logo");
    stored.project.tags = vec!["blockchain".to_string()];
    stored.project.license = "WTFPL".to_string();
    stored.project.category = "web".to_string();

    let mut report = ValidationReport::default();
    check_record(&mut report, &allowlists, &config, &stored);

    assert_eq!(report.errors.len(), 3);
}

#[test]
fn test_fail_hard_on_corrupt_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let projects = dir.path().join("projects");
    fs::create_dir(&projects).expect("projects dir");
    fs::write(projects.join("broken.toml"), "slug = ").expect("write broken record");

    let store = ProjectStore::new(&projects);
    assert!(store.load_all().is_err());
}
