//! HTTP request handlers.
//!
//! Each handler extracts the request data, calls into the core services and
//! translates the result into a JSON response. Errors become [`ApiError`]
//! and are converted at the boundary; nothing here panics on bad input.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, warn};

use fossradar_core::{
    ping_search_engines, verify_signature, PushEvent, SubmissionPipeline, VisitorError,
};
use github_client::{GitHubClient, LogoUpload, ProjectPublisher, DIRECTORY_TOPIC};
use project_store::parse_github_url;

use crate::{
    errors::ApiError,
    middleware::{bearer_token, client_ip, optional_bearer_token, require_admin_key},
    models::{request::*, response::*},
    AppState, MAX_SLUG_LEN,
};

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Validates the slug parameter shared by the counter endpoints.
fn require_slug(slug: Option<String>) -> Result<String, ApiError> {
    let slug = slug
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing slug parameter".to_string()))?;
    if slug.len() > MAX_SLUG_LEN {
        return Err(ApiError::BadRequest("Slug is too long".to_string()));
    }
    Ok(slug)
}

/// GET /api/visitors?slug=
pub async fn get_visitors(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> Result<Json<VisitorCountResponse>, ApiError> {
    let slug = require_slug(query.slug)?;
    let count = state.visitors.get(&slug).await?;
    Ok(Json(VisitorCountResponse {
        slug,
        count,
        counted: None,
    }))
}

/// POST /api/visitors?slug= (slug may also come in the JSON body)
///
/// Repeat requests from the same IP for the same slug inside the dedup
/// window read the current count without incrementing it.
pub async fn post_visitors(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SlugQuery>,
    body: Option<Json<SlugBody>>,
) -> Result<Json<VisitorCountResponse>, ApiError> {
    let body_slug = body.and_then(|Json(b)| b.slug);
    let slug = require_slug(query.slug.or(body_slug))?;

    let key = format!("{}:{}", client_ip(&headers), slug);
    if !state.visitor_limiter.try_acquire(&key) {
        let count = state.visitors.get(&slug).await?;
        return Ok(Json(VisitorCountResponse {
            slug,
            count,
            counted: Some(false),
        }));
    }

    let count = state.visitors.increment(&slug).await?;
    Ok(Json(VisitorCountResponse {
        slug,
        count,
        counted: Some(true),
    }))
}

/// GET /api/hits?slug=
pub async fn get_hits(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> Result<Json<HitsResponse>, ApiError> {
    let slug = require_slug(query.slug)?;
    let count = state.hits.get(&slug).await;
    Ok(Json(HitsResponse { slug, count }))
}

/// POST /api/hits?slug=
pub async fn post_hits(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SlugQuery>,
    body: Option<Json<SlugBody>>,
) -> Result<Json<HitsResponse>, ApiError> {
    let body_slug = body.and_then(|Json(b)| b.slug);
    let slug = require_slug(query.slug.or(body_slug))?;

    if !state.hits_limiter.try_acquire(&client_ip(&headers)) {
        return Err(ApiError::RateLimited);
    }

    let count = state.hits.increment(&slug).await?;
    Ok(Json(HitsResponse { slug, count }))
}

/// GET /api/check-duplicate?repoUrl=
pub async fn check_duplicate(
    State(state): State<AppState>,
    Query(query): Query<RepoUrlQuery>,
) -> Result<Json<DuplicateCheckResponse>, ApiError> {
    let repo_url = query
        .repo_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing repoUrl parameter".to_string()))?;

    let existing = state.store.find_by_repo(&repo_url)?;
    Ok(Json(DuplicateCheckResponse {
        exists: existing.is_some(),
        project: existing.map(|stored| DuplicateProject {
            slug: stored.project.slug,
            name: stored.project.name,
        }),
    }))
}

/// GET /api/validate-repo?repoUrl=
pub async fn validate_repo(
    State(state): State<AppState>,
    Query(query): Query<RepoUrlQuery>,
) -> Result<Json<ValidateRepoResponse>, ApiError> {
    let repo_url = query
        .repo_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing repoUrl parameter".to_string()))?;

    let Some((owner, repo)) = parse_github_url(&repo_url) else {
        return Err(ApiError::BadRequest(
            "Not a valid GitHub repository URL".to_string(),
        ));
    };

    if !state.github.is_repo_accessible(&owner, &repo).await {
        return Err(ApiError::NotFound(
            "Repository not found or not publicly accessible".to_string(),
        ));
    }

    let metadata = state.github.get_repository(&owner, &repo).await.map_err(|error| {
        warn!(owner = %owner, repo = %repo, error = %error, "Metadata fetch failed");
        ApiError::Internal("Failed to fetch repository metadata".to_string())
    })?;

    // Topic status is advisory on this endpoint; a failed read is "no".
    let has_topic = state
        .github
        .has_topic(&owner, &repo, DIRECTORY_TOPIC)
        .await
        .unwrap_or(false);

    Ok(Json(ValidateRepoResponse {
        valid: true,
        metadata,
        has_fossradar_topic: has_topic,
    }))
}

/// POST /api/submit-project
pub async fn submit_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitProjectRequest>,
) -> Result<(StatusCode, Json<SubmitProjectResponse>), ApiError> {
    let token = bearer_token(&headers)?;
    let client = GitHubClient::from_token(&token)?;
    let publisher = ProjectPublisher::new(client, state.config.upstream.clone());

    let logo = match request.logo_file {
        Some(logo) => {
            if logo.filename.is_empty() || logo.filename.contains('/') || logo.filename.contains("..") {
                return Err(ApiError::BadRequest("Invalid logo filename".to_string()));
            }
            Some(LogoUpload {
                content_base64: logo.content_base64,
                filename: logo.filename,
            })
        }
        None => None,
    };

    let pipeline = SubmissionPipeline::new(&state.store, state.allowlists.as_ref());
    let pr = pipeline
        .submit(&request.submission, request.submitter_name, logo, &publisher)
        .await?;

    info!(slug = %request.submission.slug, pr = pr.number, "Submission published");
    Ok((
        StatusCode::CREATED,
        Json(SubmitProjectResponse {
            pr_url: pr.html_url,
            pr_number: pr.number,
            message: "Pull request created. A maintainer will review your submission.".to_string(),
        }),
    ))
}

/// POST /api/star
pub async fn star_project(
    State(_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StarRequest>,
) -> Result<Json<StarResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let Some((owner, repo)) = parse_github_url(&request.repo_url) else {
        return Err(ApiError::BadRequest(
            "Not a valid GitHub repository URL".to_string(),
        ));
    };

    let client = GitHubClient::from_token(&token)?;
    client.star_repository(&owner, &repo).await?;
    Ok(Json(StarResponse { starred: true }))
}

/// GET /api/star?repoUrl=
///
/// An unauthenticated caller gets `starred: false` instead of a 401; the
/// star button simply renders unfilled.
pub async fn check_star(
    State(_state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RepoUrlQuery>,
) -> Result<Json<StarResponse>, ApiError> {
    let repo_url = query
        .repo_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing repoUrl parameter".to_string()))?;
    let Some((owner, repo)) = parse_github_url(&repo_url) else {
        return Err(ApiError::BadRequest(
            "Not a valid GitHub repository URL".to_string(),
        ));
    };

    let Some(token) = optional_bearer_token(&headers) else {
        return Ok(Json(StarResponse { starred: false }));
    };

    let client = GitHubClient::from_token(&token)?;
    let starred = client.is_starred(&owner, &repo).await?;
    Ok(Json(StarResponse { starred }))
}

/// GET /api/user-repos
pub async fn user_repos(
    State(_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserReposResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let client = GitHubClient::from_token(&token)?;
    let repos = client.list_user_repositories().await?;
    Ok(Json(UserReposResponse { repos }))
}

/// POST /api/webhook
///
/// GitHub push webhook. The signature is verified against the raw body
/// before anything is parsed; a push to the default branch that touches
/// project data refreshes the catalog snapshot and pings search engines.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let Some(secret) = &state.config.webhook_secret else {
        return Err(ApiError::Internal(
            "Webhook secret is not configured".to_string(),
        ));
    };

    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing webhook signature"))?;

    if !verify_signature(&body, signature, secret) {
        return Err(ApiError::unauthorized("Invalid webhook signature"));
    }

    let event_type = headers
        .get("x-github-event")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if event_type != "push" {
        return Ok(Json(WebhookResponse {
            received: true,
            processed: false,
            sitemap: None,
        }));
    }

    let event: PushEvent = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid push payload".to_string()))?;

    if !event.is_default_branch_push() || !event.touches_project_data() {
        return Ok(Json(WebhookResponse {
            received: true,
            processed: false,
            sitemap: None,
        }));
    }

    // Re-validate the catalog so a bad merge is noticed here, not on the
    // next page render.
    match state.store.load_all() {
        Ok(projects) => info!(count = projects.len(), "Catalog refreshed after push"),
        Err(error) => warn!(error = %error, "Catalog failed validation after push"),
    }

    let results = ping_search_engines(&state.http, &state.config.sitemap_url).await;
    Ok(Json(WebhookResponse {
        received: true,
        processed: true,
        sitemap: Some(results),
    }))
}

/// POST /api/ping-sitemap
pub async fn ping_sitemap(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PingSitemapResponse>, ApiError> {
    require_admin_key(&headers, &state.config)?;
    let results = ping_search_engines(&state.http, &state.config.sitemap_url).await;
    Ok(Json(PingSitemapResponse { results }))
}

/// GET /api/admin/visitor-stats?action=stats|top|all&limit=
pub async fn admin_visitor_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminStatsQuery>,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    require_admin_key(&headers, &state.config)?;

    let action = query.action.as_deref().unwrap_or("stats");
    let limit = query.limit.unwrap_or(10).min(100);

    match action {
        "stats" => match state.visitors.stats().await {
            Ok(stats) => Ok(Json(AdminStatsResponse {
                supported: true,
                stats: Some(stats),
                visitors: None,
            })),
            Err(VisitorError::NotSupported) => Ok(Json(degraded_stats())),
            Err(error) => Err(error.into()),
        },
        "top" | "all" => {
            let result = if action == "top" {
                state.visitors.top(limit).await
            } else {
                state.visitors.all(limit).await
            };
            match result {
                Ok(records) => Ok(Json(AdminStatsResponse {
                    supported: true,
                    stats: None,
                    visitors: Some(records),
                })),
                Err(VisitorError::NotSupported) => Ok(Json(degraded_stats())),
                Err(error) => Err(error.into()),
            }
        }
        other => Err(ApiError::BadRequest(format!("Unknown action \"{}\"", other))),
    }
}

/// The degraded-mode answer for backends without aggregate support.
fn degraded_stats() -> AdminStatsResponse {
    warn!("Visitor backend does not support aggregate queries");
    AdminStatsResponse {
        supported: false,
        stats: None,
        visitors: None,
    }
}
