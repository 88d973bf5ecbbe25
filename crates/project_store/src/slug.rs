//! Slug generation and validation.
//!
//! Slugs are the URL identity of a project and double as the record filename
//! stem, so the rules here are intentionally strict: lowercase letters,
//! digits and single hyphens only, 2 to 60 characters, never a reserved word.

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;

/// Slugs that collide with site routes and can never name a project.
const RESERVED_SLUGS: [&str; 11] = [
    "new", "admin", "api", "auth", "projects", "tags", "search", "submit", "about", "privacy",
    "terms",
];

/// Derives a URL-safe slug from a project name.
///
/// Whitespace and underscores become hyphens, everything that is not a
/// lowercase ASCII letter, digit or hyphen is dropped, runs of hyphens
/// collapse to one, and the result is trimmed to 60 characters without a
/// trailing hyphen.
pub fn generate_slug(project_name: &str) -> String {
    let mut slug = String::with_capacity(project_name.len());
    let mut last_was_hyphen = true; // suppresses leading hyphens

    for ch in project_name.trim().chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_was_hyphen = false;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(60);
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Whether a slug satisfies the schema rules, including the reserved list.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() >= 2
        && slug.len() <= 60
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !is_reserved_slug(slug)
}

/// Whether a slug collides with a reserved site route.
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Makes a slug unique against a set of existing slugs by appending `-N`.
pub fn generate_unique_slug(base_slug: &str, existing_slugs: &[String]) -> String {
    let mut slug = base_slug.to_string();
    let mut counter = 1;

    while existing_slugs.iter().any(|s| s == &slug) {
        slug = format!("{}-{}", base_slug, counter);
        counter += 1;
    }

    slug
}
