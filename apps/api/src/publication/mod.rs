// Publication workflow.
// Topic selection → parallel generation → selection → draft(pending) → approval → CMS publish.
// Publishing always waits for an explicit approval; cycles only produce drafts.

pub mod handlers;
pub mod lifecycle;
pub mod prompts;
pub mod scheduler;
pub mod social;
pub mod topics;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::cms::{CmsConnector, CmsSettings};
use crate::errors::AppError;
use crate::generation::outline::ArticleOutline;
use crate::generation::parallel::generate_all;
use crate::generation::scoring::ArticleScorer;
use crate::generation::selector::select;
use crate::generation::writers::ArticleWriter;
use crate::llm_client::{Provider, ProviderCredentials};
use crate::models::post::{ApprovalStatus, BlogPostRow, NewBlogPost};
use crate::models::publication::LogStatus;
use crate::models::social::SocialPostRow;
use crate::publication::lifecycle::ArticleState;
use crate::publication::social::{SocialBrief, SocialWriter};
use crate::publication::topics::{select_best_topic, topics_from_catalog, trending_topics};
use crate::store::PostStore;

const CATALOG_PRODUCT_LIMIT: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Where a cycle takes its topic from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicSource {
    /// Generate fresh topics from the CMS catalogue.
    Catalog,
    /// Oldest pending topic already in the store.
    #[default]
    Pending,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub post_id: i64,
    pub topic: String,
    pub writer: Provider,
    pub total_score: u32,
    pub articles_generated: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    pub post_id: i64,
    pub state: ArticleState,
    pub social_posts: Vec<SocialPostRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub post_id: i64,
    pub state: ArticleState,
    pub odoo_post_id: i64,
}

/// Owner-facing notification. Delivered through the log stream.
pub fn notify_owner(title: &str, content: &str) {
    info!(target: "blogwright::notify", title, "{content}");
}

// ────────────────────────────────────────────────────────────────────────────
// Publisher
// ────────────────────────────────────────────────────────────────────────────

pub struct Publisher {
    store: Arc<dyn PostStore>,
    cms: Arc<dyn CmsConnector>,
    writer: Arc<dyn ArticleWriter>,
    social: Arc<dyn SocialWriter>,
    scorer: ArticleScorer,
    credentials: ProviderCredentials,
    provider_timeout: Duration,
    site_url: String,
}

/// Everything a cycle needs once a topic has been chosen.
struct ChosenTopic {
    topic_id: i64,
    name: String,
    keywords: Vec<String>,
    related_products: Vec<String>,
    outline: ArticleOutline,
}

impl Publisher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn PostStore>,
        cms: Arc<dyn CmsConnector>,
        writer: Arc<dyn ArticleWriter>,
        social: Arc<dyn SocialWriter>,
        scorer: ArticleScorer,
        credentials: ProviderCredentials,
        provider_timeout: Duration,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cms,
            writer,
            social,
            scorer,
            credentials,
            provider_timeout,
            site_url: site_url.into(),
        }
    }

    /// Scheduled cycle: topics come from the CMS catalogue.
    pub async fn run_cycle(&self) -> Result<CycleReport, AppError> {
        self.run(TopicSource::Catalog).await
    }

    /// Manual cycle: the oldest pending topic, no CMS access needed.
    pub async fn run_manual_cycle(&self) -> Result<CycleReport, AppError> {
        self.run(TopicSource::Pending).await
    }

    pub async fn run(&self, source: TopicSource) -> Result<CycleReport, AppError> {
        let started = Instant::now();
        info!(?source, "========== Starting publication cycle ==========");

        let result = async {
            let topic = match source {
                TopicSource::Catalog => self.topic_from_catalog().await?,
                TopicSource::Pending => self.oldest_pending_topic().await?,
            };
            self.produce_draft(topic, started).await
        }
        .await;

        match result {
            Ok(report) => {
                info!(
                    post_id = report.post_id,
                    writer = %report.writer,
                    score = report.total_score,
                    "========== Publication cycle completed in {}ms ==========",
                    report.duration_ms
                );
                notify_owner(
                    "Nowy wpis czeka na zatwierdzenie",
                    &format!(
                        "Wpis \"{}\" został wygenerowany.\nWynik: {} ({}/100)\nCzas: {}ms",
                        report.topic,
                        report.writer.label(),
                        report.total_score,
                        report.duration_ms
                    ),
                );
                Ok(report)
            }
            Err(e) => {
                error!("Publication cycle failed: {e}");
                self.record(None, LogStatus::Failed, Some(&e.to_string()))
                    .await;
                notify_owner(
                    "Błąd publikacji wpisu",
                    &format!(
                        "Publikacja wpisu nie powiodła się.\nBłąd: {e}\nCzas: {}ms",
                        started.elapsed().as_millis()
                    ),
                );
                Err(e)
            }
        }
    }

    /// Fetches the catalogue, stores every generated topic and picks the best.
    async fn topic_from_catalog(&self) -> Result<ChosenTopic, AppError> {
        let settings = CmsSettings::from_config(&self.store.config_map().await?)?;
        let cms = self.cms.connect(&settings).await?;

        let products = cms.products(CATALOG_PRODUCT_LIMIT).await?;
        let categories = cms.categories().await?;
        info!(
            "Fetched {} products and {} categories",
            products.len(),
            categories.len()
        );

        let mut candidates = topics_from_catalog(&products, &categories);
        candidates.extend(trending_topics());

        let best = select_best_topic(&candidates)
            .ok_or_else(|| AppError::NotFound("No suitable topic found".to_string()))?;

        let mut chosen = None;
        for (i, topic) in candidates.into_iter().enumerate() {
            let row = self.store.create_topic(topic).await?;
            if i == best {
                chosen = Some(row);
            }
        }
        let row = chosen.ok_or_else(|| AppError::NotFound("No suitable topic found".to_string()))?;

        info!(topic = %row.topic_name, "Selected topic");
        Ok(ChosenTopic {
            topic_id: row.id,
            name: row.topic_name,
            keywords: row.keywords,
            related_products: row.related_products,
            outline: row.outline.0,
        })
    }

    async fn oldest_pending_topic(&self) -> Result<ChosenTopic, AppError> {
        let row = self
            .store
            .pending_topics()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::NotFound(
                    "No pending topics found. Please add topics first.".to_string(),
                )
            })?;

        info!(topic = %row.topic_name, category = %row.category, "Selected pending topic");
        Ok(ChosenTopic {
            topic_id: row.id,
            name: row.topic_name,
            keywords: row.keywords,
            related_products: row.related_products,
            outline: row.outline.0,
        })
    }

    /// Generate → select → store as draft(pending) → mark topic used → log.
    async fn produce_draft(
        &self,
        topic: ChosenTopic,
        started: Instant,
    ) -> Result<CycleReport, AppError> {
        let articles = generate_all(
            self.writer.as_ref(),
            &topic.outline,
            &self.credentials,
            self.provider_timeout,
        )
        .await?;
        let articles_generated = articles.len();

        let selection = select(
            &self.scorer,
            articles,
            &topic.keywords,
            &topic.related_products,
        )?;
        let best = selection.best;

        let post = self
            .store
            .create_post(NewBlogPost::from_optimized(&best, &topic.keywords))
            .await?;
        self.store.mark_topic_used(topic.topic_id).await?;
        self.record(Some(post.id), LogStatus::Success, None).await;

        Ok(CycleReport {
            post_id: post.id,
            topic: topic.name,
            writer: best.article.writer,
            total_score: best.score.total_score,
            articles_generated,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    // ── Approval workflow ────────────────────────────────────────────────

    async fn load(&self, post_id: i64) -> Result<BlogPostRow, AppError> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))
    }

    /// pending → approved, then drafts social posts for every platform.
    ///
    /// A social generation failure does not undo the approval; the post
    /// simply has no social drafts.
    pub async fn approve(&self, post_id: i64) -> Result<ApprovalOutcome, AppError> {
        let post = self.load(post_id).await?;
        let state = ArticleState::of(&post)?.approve()?;
        if !self
            .store
            .decide_approval(post_id, ApprovalStatus::Approved, None)
            .await?
        {
            return Err(AppError::InvalidState(format!(
                "post {post_id} is no longer pending"
            )));
        }
        info!(post_id, "Article approved");

        let brief = SocialBrief {
            title: post.title.clone(),
            meta_description: post.meta_description.clone().unwrap_or_default(),
            keywords: post.keywords.clone(),
            url: format!("{}/blog/{}", self.site_url.trim_end_matches('/'), post.id),
        };

        let social_posts = match self.social.write_posts(&brief).await {
            Ok(drafts) => self.store.create_social_posts(post_id, drafts).await?,
            Err(e) => {
                warn!(post_id, "Social media generation failed: {e}");
                Vec::new()
            }
        };

        notify_owner(
            "Artykuł zatwierdzony",
            &format!(
                "Artykuł \"{}\" został zatwierdzony. Wygenerowano {} postów social media.",
                post.title,
                social_posts.len()
            ),
        );

        Ok(ApprovalOutcome {
            post_id,
            state,
            social_posts,
        })
    }

    /// pending → rejected. Terminal.
    pub async fn reject(&self, post_id: i64, reason: Option<&str>) -> Result<ArticleState, AppError> {
        let post = self.load(post_id).await?;
        let state = ArticleState::of(&post)?.reject()?;
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if !self
            .store
            .decide_approval(post_id, ApprovalStatus::Rejected, reason)
            .await?
        {
            return Err(AppError::InvalidState(format!(
                "post {post_id} is no longer pending"
            )));
        }

        info!(post_id, "Article rejected");
        notify_owner(
            "Artykuł odrzucony",
            &format!(
                "Artykuł \"{}\" został odrzucony.{}",
                post.title,
                reason.map(|r| format!(" Powód: {r}")).unwrap_or_default()
            ),
        );
        Ok(state)
    }

    /// approved → published. Anything else is refused before the CMS is touched.
    ///
    /// The post is claimed in the store first, so only one attempt reaches the
    /// CMS. A failed push releases the claim; a push that went through but could
    /// not be saved keeps it, since the article is already live.
    pub async fn publish(&self, post_id: i64) -> Result<PublishOutcome, AppError> {
        let post = self.load(post_id).await?;
        let state = ArticleState::of(&post)?.publish()?;
        if !self.store.claim_for_publish(post_id).await? {
            return Err(AppError::InvalidState(format!(
                "post {post_id} is already being published or is not approved"
            )));
        }

        let odoo_post_id = match self.push_to_cms(&post).await {
            Ok(id) => id,
            Err(e) => {
                error!(post_id, "Failed to publish article: {e}");
                if let Err(release) = self.store.release_publish_claim(post_id).await {
                    error!(post_id, "Failed to release publish claim: {release}");
                }
                self.record(
                    Some(post_id),
                    LogStatus::Failed,
                    Some(&format!("Failed to publish: {e}")),
                )
                .await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .store
            .mark_published(post_id, odoo_post_id, Utc::now())
            .await
        {
            error!(
                post_id,
                odoo_post_id, "Article is live in Odoo but saving the result failed: {e}"
            );
            let message = format!(
                "Published to Odoo as post {odoo_post_id} but saving the result failed: {e}"
            );
            self.record(Some(post_id), LogStatus::Failed, Some(&message))
                .await;
            return Err(AppError::external("postgres", message));
        }

        self.record(Some(post_id), LogStatus::Success, None).await;
        info!(post_id, odoo_post_id, "Article published");
        notify_owner(
            "Artykuł opublikowany",
            &format!(
                "Artykuł \"{}\" został opublikowany (Odoo ID: {odoo_post_id}).",
                post.title
            ),
        );
        Ok(PublishOutcome {
            post_id,
            state,
            odoo_post_id,
        })
    }

    async fn push_to_cms(&self, post: &BlogPostRow) -> Result<i64, AppError> {
        let settings = CmsSettings::from_config(&self.store.config_map().await?)?;
        let cms = self.cms.connect(&settings).await?;

        let odoo_post_id = cms
            .create_post(
                &post.title,
                &post.content,
                post.meta_description.as_deref().unwrap_or_default(),
                settings.blog_id,
            )
            .await?;
        cms.publish(odoo_post_id).await?;
        Ok(odoo_post_id)
    }

    /// Writes a publication-log entry. A failing log write is reported, never raised.
    async fn record(&self, post_id: Option<i64>, status: LogStatus, message: Option<&str>) {
        if let Err(e) = self.store.log_publication(post_id, status, message).await {
            error!(?post_id, "Failed to write publication log: {e}");
        }
    }
}
