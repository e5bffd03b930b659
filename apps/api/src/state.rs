use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::generation::scoring::ArticleScorer;
use crate::generation::writers::ArticleWriter;
use crate::publication::scheduler::Scheduler;
use crate::publication::Publisher;
use crate::store::PostStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Lazily connected; only used to report pool status.
    pub db: Database,
    pub store: Arc<dyn PostStore>,
    /// Provider adapter for `POST /api/v1/generate`. Swapped for a fake in tests.
    pub writer: Arc<dyn ArticleWriter>,
    pub scorer: ArticleScorer,
    pub publisher: Arc<Publisher>,
    pub scheduler: Arc<Scheduler>,
    pub config: Config,
}
