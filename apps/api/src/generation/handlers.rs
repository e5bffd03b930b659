//! Axum route handlers for the Generation API.

use std::time::{Duration, Instant};

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::outline::ArticleOutline;
use crate::generation::parallel::generate_all;
use crate::generation::selector::{select, OptimizedArticle};
use crate::llm_client::Provider;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub total_articles: usize,
    pub selected_writer: Provider,
    pub response_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub article: OptimizedArticle,
    pub alternatives: Vec<OptimizedArticle>,
    pub metadata: GenerationMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Outline in, best article out. Every configured writer runs in parallel;
/// the response carries the winner, the ranked runners-up and timing.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<GenerateResponse>, AppError> {
    require_bearer(&headers, state.config.api_secret.as_deref())?;

    let outline =
        ArticleOutline::from_payload(&body).map_err(|e| AppError::Validation(e.to_string()))?;

    info!(topic = %outline.topic, "Generation requested");
    let started = Instant::now();

    let articles = generate_all(
        state.writer.as_ref(),
        &outline,
        &state.config.credentials,
        Duration::from_secs(state.config.provider_timeout_secs),
    )
    .await?;
    let total_articles = articles.len();

    let selection = select(&state.scorer, articles, &outline.keywords, &[])?;
    let response_time_ms = started.elapsed().as_millis() as u64;

    info!(
        writer = %selection.best.article.writer,
        score = selection.best.score.total_score,
        response_time_ms,
        "Generation complete"
    );

    Ok(Json(GenerateResponse {
        success: true,
        metadata: GenerationMetadata {
            total_articles,
            selected_writer: selection.best.article.writer,
            response_time_ms,
        },
        article: selection.best,
        alternatives: selection.alternatives,
    }))
}

/// Checks `Authorization: Bearer <secret>`. Open when no secret is configured.
pub(crate) fn require_bearer(headers: &HeaderMap, secret: Option<&str>) -> Result<(), AppError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(secret) {
        Ok(())
    } else {
        warn!("Rejected request with missing or wrong bearer token");
        Err(AppError::Unauthorized)
    }
}
