//! In-process `PostStore` for tests. Mirrors the Postgres ordering rules.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;

use super::PostStore;
use crate::errors::AppError;
use crate::models::post::{ApprovalStatus, BlogPostRow, NewBlogPost, PostStatus};
use crate::models::publication::{LogStatus, PublicationLogRow};
use crate::models::social::{NewSocialPost, SocialPostRow};
use crate::models::topic::{NewTopic, TopicRow};

#[derive(Default)]
struct Tables {
    posts: Vec<BlogPostRow>,
    topics: Vec<TopicRow>,
    logs: Vec<PublicationLogRow>,
    social: Vec<SocialPostRow>,
    config: BTreeMap<String, String>,
    next_id: i64,
    /// Monotonic clock so "oldest" and "newest" are unambiguous.
    ticks: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.timestamp_opt(self.ticks, 0).unwrap()
    }

    fn post_mut(&mut self, id: i64) -> Result<&mut BlogPostRow, AppError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_mark_published: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `mark_published` fail as a lost connection would.
    pub fn fail_mark_published(&self) {
        self.fail_mark_published.store(true, Ordering::SeqCst);
    }

    pub async fn topic(&self, id: i64) -> Option<TopicRow> {
        self.tables
            .read()
            .await
            .topics
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPostRow, AppError> {
        let mut tables = self.tables.write().await;
        let row = BlogPostRow {
            id: tables.next_id(),
            odoo_post_id: None,
            title: post.title,
            content: post.content,
            meta_description: Some(post.meta_description),
            keywords: post.keywords,
            ai_writer: post.ai_writer,
            seo_score: Some(post.seo_score),
            readability_score: Some(post.readability_score),
            engagement_score: Some(post.engagement_score),
            total_score: Some(post.total_score),
            status: PostStatus::Draft.as_str().to_string(),
            approval_status: ApprovalStatus::Pending.as_str().to_string(),
            rejection_reason: None,
            published_date: None,
            created_at: tables.now(),
        };
        tables.posts.push(row.clone());
        Ok(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<BlogPostRow>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<BlogPostRow>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().rev().cloned().collect())
    }

    async fn decide_approval(
        &self,
        id: i64,
        approval: ApprovalStatus,
        reason: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let post = tables.post_mut(id)?;
        if post.approval_status != ApprovalStatus::Pending.as_str()
            || post.status != PostStatus::Draft.as_str()
        {
            return Ok(false);
        }
        post.approval_status = approval.as_str().to_string();
        post.rejection_reason = reason.map(str::to_string);
        Ok(true)
    }

    async fn claim_for_publish(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let post = tables.post_mut(id)?;
        if post.approval_status != ApprovalStatus::Approved.as_str()
            || post.status != PostStatus::Draft.as_str()
        {
            return Ok(false);
        }
        post.status = PostStatus::Publishing.as_str().to_string();
        Ok(true)
    }

    async fn release_publish_claim(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let post = tables.post_mut(id)?;
        if post.status == PostStatus::Publishing.as_str() {
            post.status = PostStatus::Draft.as_str().to_string();
        }
        Ok(())
    }

    async fn mark_published(
        &self,
        id: i64,
        odoo_post_id: i64,
        published_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.fail_mark_published.load(Ordering::SeqCst) {
            return Err(AppError::external("postgres", "connection reset by peer"));
        }
        let mut tables = self.tables.write().await;
        let post = tables.post_mut(id)?;
        if post.status != PostStatus::Publishing.as_str() {
            return Err(AppError::InvalidState(format!(
                "post {id} is not being published"
            )));
        }
        post.status = PostStatus::Published.as_str().to_string();
        post.odoo_post_id = Some(odoo_post_id);
        post.published_date = Some(published_at);
        Ok(())
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<TopicRow, AppError> {
        let mut tables = self.tables.write().await;
        let row = TopicRow {
            id: tables.next_id(),
            topic_name: topic.topic_name,
            category: topic.category.as_str().to_string(),
            keywords: topic.keywords,
            seo_difficulty: topic.seo_difficulty,
            related_products: topic.related_products,
            outline: Json(topic.outline),
            status: "pending".to_string(),
            created_at: tables.now(),
            used_at: None,
        };
        tables.topics.push(row.clone());
        Ok(row)
    }

    async fn pending_topics(&self) -> Result<Vec<TopicRow>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .topics
            .iter()
            .filter(|t| t.status == "pending")
            .cloned()
            .collect())
    }

    async fn mark_topic_used(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let now = tables.now();
        if let Some(topic) = tables.topics.iter_mut().find(|t| t.id == id) {
            topic.status = "used".to_string();
            topic.used_at = Some(now);
        }
        Ok(())
    }

    async fn log_publication(
        &self,
        post_id: Option<i64>,
        status: LogStatus,
        error_message: Option<&str>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let row = PublicationLogRow {
            id: tables.next_id(),
            post_id,
            status: status.as_str().to_string(),
            error_message: error_message.map(str::to_string),
            created_at: tables.now(),
        };
        tables.logs.push(row);
        Ok(())
    }

    async fn publication_logs(&self, limit: i64) -> Result<Vec<PublicationLogRow>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create_social_posts(
        &self,
        blog_post_id: i64,
        posts: Vec<NewSocialPost>,
    ) -> Result<Vec<SocialPostRow>, AppError> {
        let mut tables = self.tables.write().await;
        let mut rows = Vec::with_capacity(posts.len());
        for post in posts {
            let row = SocialPostRow {
                id: tables.next_id(),
                blog_post_id,
                platform: post.platform.as_str().to_string(),
                content: post.content,
                hashtags: post.hashtags,
                status: "draft".to_string(),
                created_at: tables.now(),
            };
            tables.social.push(row.clone());
            rows.push(row);
        }
        Ok(rows)
    }

    async fn social_posts(&self, blog_post_id: i64) -> Result<Vec<SocialPostRow>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .social
            .iter()
            .filter(|s| s.blog_post_id == blog_post_id)
            .cloned()
            .collect())
    }

    async fn config_map(&self) -> Result<BTreeMap<String, String>, AppError> {
        Ok(self.tables.read().await.config.clone())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .config
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
