use super::*;

#[test]
fn test_generate_slug_basic() {
    assert_eq!(generate_slug("My Cool Project!"), "my-cool-project");
}

#[test]
fn test_generate_slug_collapses_separators() {
    assert_eq!(generate_slug("  A___B  "), "a-b");
    assert_eq!(generate_slug("a - b"), "a-b");
    assert_eq!(generate_slug("a--b"), "a-b");
}

#[test]
fn test_generate_slug_drops_non_ascii() {
    assert_eq!(generate_slug("Café Télémétrie"), "caf-tlmtrie");
}

#[test]
fn test_generate_slug_trims_hyphens() {
    assert_eq!(generate_slug("--hello--"), "hello");
    assert_eq!(generate_slug("!!!"), "");
}

#[test]
fn test_generate_slug_truncates_to_sixty() {
    let long = "a".repeat(100);
    let slug = generate_slug(&long);
    assert_eq!(slug.len(), 60);
}

#[test]
fn test_generate_slug_no_trailing_hyphen_after_truncation() {
    // 60th character lands on a separator; the cut must not leave a hyphen.
    let name = format!("{} {}", "a".repeat(59), "b".repeat(20));
    let slug = generate_slug(&name);
    assert!(!slug.ends_with('-'));
    assert!(slug.len() <= 60);
}

#[test]
fn test_is_valid_slug() {
    assert!(is_valid_slug("ab"));
    assert!(is_valid_slug("my-project-2"));
    assert!(!is_valid_slug("a"));
    assert!(!is_valid_slug(&"a".repeat(61)));
    assert!(!is_valid_slug("Has-Upper"));
    assert!(!is_valid_slug("with space"));
}

#[test]
fn test_reserved_slugs_rejected() {
    assert!(is_reserved_slug("admin"));
    assert!(is_reserved_slug("api"));
    assert!(!is_valid_slug("admin"));
    assert!(!is_reserved_slug("administrator"));
    assert!(is_valid_slug("administrator"));
}

#[test]
fn test_generate_unique_slug() {
    let existing = vec!["widget".to_string(), "widget-1".to_string()];
    assert_eq!(generate_unique_slug("widget", &existing), "widget-2");
    assert_eq!(generate_unique_slug("gadget", &existing), "gadget");
}
