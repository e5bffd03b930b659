pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::publication::handlers as publication;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/api/v1/generate", post(generation::handle_generate))
        // Posts & topics
        .route("/api/v1/posts", get(publication::handle_list_posts))
        .route("/api/v1/posts/:id", get(publication::handle_get_post))
        .route(
            "/api/v1/posts/:id/social",
            get(publication::handle_social_posts),
        )
        .route(
            "/api/v1/topics/pending",
            get(publication::handle_pending_topics),
        )
        // Publication
        .route(
            "/api/v1/publication/logs",
            get(publication::handle_publication_logs),
        )
        .route(
            "/api/v1/publication/trigger",
            post(publication::handle_trigger),
        )
        // Approval workflow
        .route(
            "/api/v1/workflow/:id/approve",
            post(publication::handle_approve),
        )
        .route(
            "/api/v1/workflow/:id/reject",
            post(publication::handle_reject),
        )
        .route(
            "/api/v1/workflow/:id/publish",
            post(publication::handle_publish),
        )
        // Settings
        .route(
            "/api/v1/config",
            get(publication::handle_get_config).put(publication::handle_put_config),
        )
        .route(
            "/api/v1/scheduler",
            get(publication::handle_scheduler_status),
        )
        .with_state(state)
}
