//! Axum route handlers for posts, topics, the approval workflow and settings.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cms::KEY_API_KEY;
use crate::errors::AppError;
use crate::generation::handlers::require_bearer;
use crate::models::post::BlogPostRow;
use crate::models::publication::PublicationLogRow;
use crate::models::social::SocialPostRow;
use crate::models::topic::TopicRow;
use crate::publication::lifecycle::ArticleState;
use crate::publication::{ApprovalOutcome, CycleReport, PublishOutcome, TopicSource};
use crate::state::AppState;

const DEFAULT_LOG_LIMIT: i64 = 50;
const MAX_LOG_LIMIT: i64 = 500;
const REDACTED: &str = "********";

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TriggerQuery {
    #[serde(default)]
    pub source: TopicSource,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectResponse {
    pub post_id: i64,
    pub state: ArticleState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    pub next_run: Option<DateTime<Utc>>,
}

// ── Posts & topics ───────────────────────────────────────────────────────

/// GET /api/v1/posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPostRow>>, AppError> {
    Ok(Json(state.store.list_posts().await?))
}

/// GET /api/v1/posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPostRow>, AppError> {
    state
        .store
        .get_post(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
}

/// GET /api/v1/posts/:id/social
pub async fn handle_social_posts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SocialPostRow>>, AppError> {
    if state.store.get_post(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Post {id} not found")));
    }
    Ok(Json(state.store.social_posts(id).await?))
}

/// GET /api/v1/topics/pending
pub async fn handle_pending_topics(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopicRow>>, AppError> {
    Ok(Json(state.store.pending_topics().await?))
}

// ── Publication ──────────────────────────────────────────────────────────

/// GET /api/v1/publication/logs?limit=N
pub async fn handle_publication_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<PublicationLogRow>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
    Ok(Json(state.store.publication_logs(limit).await?))
}

/// POST /api/v1/publication/trigger?source=pending|catalog
pub async fn handle_trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TriggerQuery>,
) -> Result<Json<CycleReport>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;
    info!(source = ?query.source, "Manual publication cycle requested");
    Ok(Json(state.publisher.run(query.source).await?))
}

// ── Workflow ─────────────────────────────────────────────────────────────

/// POST /api/v1/workflow/:id/approve
pub async fn handle_approve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ApprovalOutcome>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;
    Ok(Json(state.publisher.approve(id).await?))
}

/// POST /api/v1/workflow/:id/reject
///
/// The body is optional; `{"reason": "..."}` is stored with the rejection.
pub async fn handle_reject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<RejectResponse>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;
    let Json(request) = body.unwrap_or_default();
    let article_state = state.publisher.reject(id, request.reason.as_deref()).await?;
    Ok(Json(RejectResponse {
        post_id: id,
        state: article_state,
    }))
}

/// POST /api/v1/workflow/:id/publish
pub async fn handle_publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<PublishOutcome>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;
    Ok(Json(state.publisher.publish(id).await?))
}

// ── Settings ─────────────────────────────────────────────────────────────

fn redact(mut config: BTreeMap<String, String>) -> BTreeMap<String, String> {
    if let Some(key) = config.get_mut(KEY_API_KEY) {
        if !key.is_empty() {
            *key = REDACTED.to_string();
        }
    }
    config
}

/// GET /api/v1/config
pub async fn handle_get_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;
    Ok(Json(redact(state.store.config_map().await?)))
}

/// PUT /api/v1/config
///
/// Upserts every key in the body. Returns the full, redacted map.
pub async fn handle_put_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(updates): Json<BTreeMap<String, String>>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;
    if updates.keys().any(|k| k.trim().is_empty()) {
        return Err(AppError::Validation(
            "Configuration keys must not be empty".to_string(),
        ));
    }

    for (key, value) in &updates {
        state.store.set_config(key.trim(), value.trim()).await?;
    }
    info!(keys = ?updates.keys().collect::<Vec<_>>(), "Configuration updated");
    Ok(Json(redact(state.store.config_map().await?)))
}

/// GET /api/v1/scheduler
pub async fn handle_scheduler_status(State(state): State<AppState>) -> Json<SchedulerStatus> {
    Json(SchedulerStatus {
        running: state.scheduler.is_running(),
        next_run: state.scheduler.next_run(),
    })
}
