use super::*;
use std::fs;
use tempfile::TempDir;

fn record(slug: &str, repo: &str) -> String {
    format!(
        r#"slug = "{slug}"
name = "Project {slug}"
short_desc = "A project used to exercise the catalog store."
repo = "{repo}"
license = "MIT"
added_at = "2024-03-01"
primary_lang = "Rust"
category = "devtools"
tags = ["cli"]
looking_for_contributors = false
location_city = "Pune"
location_indian_state = "Maharashtra"
"#
    )
}

fn write_record(dir: &TempDir, filename: &str, content: &str) {
    fs::write(dir.path().join(filename), content).expect("write record");
}

#[test]
fn test_missing_directory_is_empty_catalog() {
    let store = ProjectStore::new("/nonexistent/projects");
    assert!(store.project_files().expect("no error").is_empty());
    assert!(store.load_all().expect("no error").is_empty());
}

#[test]
fn test_project_files_sorted_and_filtered() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "beta.toml", &record("beta", "https://github.com/acme/beta"));
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/alpha"));
    fs::write(dir.path().join("notes.md"), "not a record").expect("write");

    let store = ProjectStore::new(dir.path());
    assert_eq!(store.project_files().expect("list"), vec!["alpha.toml", "beta.toml"]);
}

#[test]
fn test_load_all_returns_valid_projects() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/alpha"));
    write_record(&dir, "beta.toml", &record("beta", "https://github.com/acme/beta"));

    let store = ProjectStore::new(dir.path());
    let projects = store.load_all().expect("load");

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].project.slug, "alpha");
    assert_eq!(projects[0].filename, "alpha.toml");
}

#[test]
fn test_load_all_rejects_duplicate_slug() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/alpha"));
    // Same slug under a different filename; slug check fires before the
    // filename check because files load in sorted order.
    write_record(&dir, "beta.toml", &record("alpha", "https://github.com/acme/other"));

    let store = ProjectStore::new(dir.path());
    match store.load_all() {
        Err(StoreError::DuplicateSlug { slug, file }) => {
            assert_eq!(slug, "alpha");
            assert_eq!(file, "beta.toml");
        }
        other => panic!("Expected DuplicateSlug, got {:?}", other),
    }
}

#[test]
fn test_load_all_rejects_repos_that_normalize_equal() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/widget"));
    write_record(&dir, "beta.toml", &record("beta", "https://github.com/Acme/Widget.git/"));

    let store = ProjectStore::new(dir.path());
    match store.load_all() {
        Err(StoreError::DuplicateRepo { file, .. }) => assert_eq!(file, "beta.toml"),
        other => panic!("Expected DuplicateRepo, got {:?}", other),
    }
}

#[test]
fn test_load_all_rejects_filename_mismatch() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "wrong-name.toml", &record("alpha", "https://github.com/acme/alpha"));

    let store = ProjectStore::new(dir.path());
    match store.load_all() {
        Err(StoreError::FilenameMismatch { expected, actual }) => {
            assert_eq!(expected, "alpha.toml");
            assert_eq!(actual, "wrong-name.toml");
        }
        other => panic!("Expected FilenameMismatch, got {:?}", other),
    }
}

#[test]
fn test_oversized_file_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let mut content = record("alpha", "https://github.com/acme/alpha");
    content.push_str(&format!("# {}\n", "x".repeat(crate::MAX_PROJECT_FILE_BYTES)));
    write_record(&dir, "alpha.toml", &content);

    let store = ProjectStore::new(dir.path());
    assert!(matches!(
        store.load_all(),
        Err(StoreError::FileTooLarge { .. })
    ));
}

#[test]
fn test_schema_failure_aborts_load() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/alpha"));
    let broken = record("beta", "https://github.com/acme/beta").replace(
        "short_desc = \"A project used to exercise the catalog store.\"",
        "short_desc = \"too short\"",
    );
    write_record(&dir, "beta.toml", &broken);

    let store = ProjectStore::new(dir.path());
    match store.load_all() {
        Err(StoreError::Schema { file, issues }) => {
            assert_eq!(file, "beta.toml");
            assert!(issues.iter().any(|i| i.field == "short_desc"));
        }
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_get_by_slug() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/alpha"));

    let store = ProjectStore::new(dir.path());
    let project = store.get_by_slug("alpha").expect("lookup");
    assert_eq!(project.expect("present").slug, "alpha");
    assert!(store.get_by_slug("missing").expect("lookup").is_none());
}

#[test]
fn test_get_by_slug_broken_record_reads_as_absent() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", "slug = \"alpha\"\nthis is not toml");

    let store = ProjectStore::new(dir.path());
    assert!(store.get_by_slug("alpha").expect("lookup").is_none());
}

#[test]
fn test_find_by_repo_normalizes() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/widget"));

    let store = ProjectStore::new(dir.path());
    let found = store
        .find_by_repo("https://github.com/Acme/Widget.git/")
        .expect("search");
    assert_eq!(found.expect("present").project.slug, "alpha");

    let missing = store
        .find_by_repo("https://github.com/acme/other")
        .expect("search");
    assert!(missing.is_none());
}

#[test]
fn test_slug_exists() {
    let dir = TempDir::new().expect("tempdir");
    write_record(&dir, "alpha.toml", &record("alpha", "https://github.com/acme/alpha"));

    let store = ProjectStore::new(dir.path());
    assert!(store.slug_exists("alpha").expect("check"));
    assert!(!store.slug_exists("beta").expect("check"));
}
