//! Persistence seam. Everything the publication workflow stores or reads
//! goes through `PostStore`, so the workflow can run against memory in tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::post::{ApprovalStatus, BlogPostRow, NewBlogPost};
use crate::models::publication::{LogStatus, PublicationLogRow};
use crate::models::social::{NewSocialPost, SocialPostRow};
use crate::models::topic::{NewTopic, TopicRow};

pub use postgres::PgStore;

#[async_trait]
pub trait PostStore: Send + Sync {
    // ── Posts ────────────────────────────────────────────────────────────
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPostRow, AppError>;
    async fn get_post(&self, id: i64) -> Result<Option<BlogPostRow>, AppError>;
    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<BlogPostRow>, AppError>;
    /// Records the reviewer decision on a pending draft. Returns false, and
    /// changes nothing, when the post is no longer a pending draft.
    async fn decide_approval(
        &self,
        id: i64,
        approval: ApprovalStatus,
        reason: Option<&str>,
    ) -> Result<bool, AppError>;
    /// approved draft → publishing. Returns false when another attempt holds
    /// the post or it is not an approved draft.
    async fn claim_for_publish(&self, id: i64) -> Result<bool, AppError>;
    /// publishing → draft, after a CMS push that did not go through.
    async fn release_publish_claim(&self, id: i64) -> Result<(), AppError>;
    /// publishing → published.
    async fn mark_published(
        &self,
        id: i64,
        odoo_post_id: i64,
        published_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    // ── Topics ───────────────────────────────────────────────────────────
    async fn create_topic(&self, topic: NewTopic) -> Result<TopicRow, AppError>;
    /// Oldest first.
    async fn pending_topics(&self) -> Result<Vec<TopicRow>, AppError>;
    async fn mark_topic_used(&self, id: i64) -> Result<(), AppError>;

    // ── Publication log ──────────────────────────────────────────────────
    async fn log_publication(
        &self,
        post_id: Option<i64>,
        status: LogStatus,
        error_message: Option<&str>,
    ) -> Result<(), AppError>;
    /// Newest first.
    async fn publication_logs(&self, limit: i64) -> Result<Vec<PublicationLogRow>, AppError>;

    // ── Social posts ─────────────────────────────────────────────────────
    async fn create_social_posts(
        &self,
        blog_post_id: i64,
        posts: Vec<NewSocialPost>,
    ) -> Result<Vec<SocialPostRow>, AppError>;
    async fn social_posts(&self, blog_post_id: i64) -> Result<Vec<SocialPostRow>, AppError>;

    // ── Configuration ────────────────────────────────────────────────────
    async fn config_map(&self) -> Result<BTreeMap<String, String>, AppError>;
    async fn set_config(&self, key: &str, value: &str) -> Result<(), AppError>;
}
