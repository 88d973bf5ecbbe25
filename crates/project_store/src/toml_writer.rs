//! Canonical TOML rendering for new submissions.
//!
//! Record files are written field by field in a fixed order rather than
//! through a generic serializer, so every file in `data/projects/` reads the
//! same way in review and diffs stay minimal. Server-computed fields are
//! pinned to their defaults; the enrichment pipeline fills them in later.

use crate::schema::ProjectSubmission;

#[cfg(test)]
#[path = "toml_writer_tests.rs"]
mod tests;

/// Renders the canonical TOML text for a submission.
pub fn render_project_toml(submission: &ProjectSubmission) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("slug = {}", toml_string(&submission.slug)));
    lines.push(format!("name = {}", toml_string(&submission.name)));
    lines.push(format!(
        "short_desc = {}",
        toml_string(&submission.short_desc)
    ));

    if let Some(website) = non_empty(&submission.website) {
        lines.push(format!("website = {}", toml_string(website)));
    }

    lines.push(format!("repo = {}", toml_string(&submission.repo)));
    lines.push(format!("license = {}", toml_string(&submission.license)));

    if let Some(logo) = non_empty(&submission.logo) {
        lines.push(format!("logo = {}", toml_string(logo)));
    }

    lines.push(format!("added_at = {}", toml_string(&submission.added_at)));
    lines.push(String::new());

    lines.push(format!(
        "primary_lang = {}",
        toml_string(&submission.primary_lang)
    ));
    lines.push(format!("category = {}", toml_string(&submission.category)));
    let tags = submission
        .tags
        .iter()
        .map(|tag| toml_string(tag))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("tags = [{}]", tags));
    lines.push(format!(
        "looking_for_contributors = {}",
        submission.looking_for_contributors
    ));
    lines.push(format!(
        "location_city = {}",
        toml_string(&submission.location_city)
    ));
    lines.push(format!(
        "location_indian_state = {}",
        toml_string(&submission.location_indian_state)
    ));
    lines.push(String::new());

    // Filled in by enrichment after the record is merged.
    lines.push("good_first_issues = 0".to_string());
    lines.push("stars = 0".to_string());
    lines.push("verified = false".to_string());

    if let Some(connection) = submission.india_connection {
        lines.push(String::new());
        lines.push("# India Connection".to_string());
        lines.push(format!(
            "india_connection = {}",
            toml_string(connection.as_str())
        ));

        if let Some(details) = non_empty(&submission.india_connection_details) {
            lines.push(format!(
                "india_connection_details = {}",
                toml_string(details)
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Quotes and escapes a value as a TOML basic string.
fn toml_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
