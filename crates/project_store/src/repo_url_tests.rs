use super::*;

#[test]
fn test_normalize_strips_git_suffix_and_trailing_slash() {
    assert_eq!(
        normalize_repo_url("https://github.com/acme/widget.git/"),
        "https://github.com/acme/widget"
    );
    assert_eq!(
        normalize_repo_url("https://github.com/acme/widget"),
        "https://github.com/acme/widget"
    );
}

#[test]
fn test_normalize_lowercases() {
    assert_eq!(
        normalize_repo_url("https://github.com/Acme/Widget"),
        "https://github.com/acme/widget"
    );
}

#[test]
fn test_normalized_urls_compare_equal() {
    let a = normalize_repo_url("https://github.com/acme/widget.git/");
    let b = normalize_repo_url("https://github.com/acme/widget");
    assert_eq!(a, b);
}

#[test]
fn test_parse_github_url() {
    assert_eq!(
        parse_github_url("https://github.com/acme/widget"),
        Some(("acme".to_string(), "widget".to_string()))
    );
    assert_eq!(
        parse_github_url("https://github.com/acme/widget.git"),
        Some(("acme".to_string(), "widget".to_string()))
    );
    assert_eq!(
        parse_github_url("https://github.com/acme/widget/"),
        Some(("acme".to_string(), "widget".to_string()))
    );
}

#[test]
fn test_parse_github_url_rejects_other_hosts() {
    assert_eq!(parse_github_url("https://gitlab.com/acme/widget"), None);
    assert_eq!(parse_github_url("not a url"), None);
}

#[test]
fn test_parse_github_url_requires_owner_and_repo() {
    assert_eq!(parse_github_url("https://github.com/acme"), None);
    assert_eq!(parse_github_url("https://github.com/"), None);
}
