use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use super::PostStore;
use crate::db::Database;
use crate::errors::AppError;
use crate::models::post::{ApprovalStatus, BlogPostRow, NewBlogPost, PostStatus};
use crate::models::publication::{LogStatus, PublicationLogRow};
use crate::models::social::{NewSocialPost, SocialPostRow};
use crate::models::topic::{NewTopic, TopicRow};

/// `PostStore` backed by PostgreSQL. Connects on first query.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connection and migration failures surface as an unavailable datastore.
    async fn pool(&self) -> Result<&PgPool, AppError> {
        self.db
            .pool()
            .await
            .map_err(|e| AppError::external("postgres", format!("{e:#}")))
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPostRow, AppError> {
        let row = sqlx::query_as::<_, BlogPostRow>(
            r#"
            INSERT INTO blog_posts
                (title, content, meta_description, keywords, ai_writer,
                 seo_score, readability_score, engagement_score, total_score,
                 status, approval_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.meta_description)
        .bind(&post.keywords)
        .bind(&post.ai_writer)
        .bind(post.seo_score)
        .bind(post.readability_score)
        .bind(post.engagement_score)
        .bind(post.total_score)
        .bind(PostStatus::Draft.as_str())
        .bind(ApprovalStatus::Pending.as_str())
        .fetch_one(self.pool().await?)
        .await?;

        Ok(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<BlogPostRow>, AppError> {
        let row = sqlx::query_as::<_, BlogPostRow>("SELECT * FROM blog_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(row)
    }

    async fn list_posts(&self) -> Result<Vec<BlogPostRow>, AppError> {
        let rows = sqlx::query_as::<_, BlogPostRow>(
            "SELECT * FROM blog_posts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool().await?)
        .await?;
        Ok(rows)
    }

    async fn decide_approval(
        &self,
        id: i64,
        approval: ApprovalStatus,
        reason: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts SET approval_status = $2, rejection_reason = $3
            WHERE id = $1 AND approval_status = $4 AND status = $5
            "#,
        )
        .bind(id)
        .bind(approval.as_str())
        .bind(reason)
        .bind(ApprovalStatus::Pending.as_str())
        .bind(PostStatus::Draft.as_str())
        .execute(self.pool().await?)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn claim_for_publish(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts SET status = $2
            WHERE id = $1 AND approval_status = $3 AND status = $4
            "#,
        )
        .bind(id)
        .bind(PostStatus::Publishing.as_str())
        .bind(ApprovalStatus::Approved.as_str())
        .bind(PostStatus::Draft.as_str())
        .execute(self.pool().await?)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_publish_claim(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE blog_posts SET status = $2 WHERE id = $1 AND status = $3")
            .bind(id)
            .bind(PostStatus::Draft.as_str())
            .bind(PostStatus::Publishing.as_str())
            .execute(self.pool().await?)
            .await?;
        Ok(())
    }

    async fn mark_published(
        &self,
        id: i64,
        odoo_post_id: i64,
        published_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET status = $2, odoo_post_id = $3, published_date = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(id)
        .bind(PostStatus::Published.as_str())
        .bind(odoo_post_id)
        .bind(published_at)
        .bind(PostStatus::Publishing.as_str())
        .execute(self.pool().await?)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(format!(
                "post {id} is not being published"
            )));
        }
        Ok(())
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<TopicRow, AppError> {
        let row = sqlx::query_as::<_, TopicRow>(
            r#"
            INSERT INTO topics
                (topic_name, category, keywords, seo_difficulty, related_products, outline)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&topic.topic_name)
        .bind(topic.category.as_str())
        .bind(&topic.keywords)
        .bind(topic.seo_difficulty)
        .bind(&topic.related_products)
        .bind(Json(&topic.outline))
        .fetch_one(self.pool().await?)
        .await?;
        Ok(row)
    }

    async fn pending_topics(&self) -> Result<Vec<TopicRow>, AppError> {
        let rows = sqlx::query_as::<_, TopicRow>(
            "SELECT * FROM topics WHERE status = 'pending' ORDER BY created_at, id",
        )
        .fetch_all(self.pool().await?)
        .await?;
        Ok(rows)
    }

    async fn mark_topic_used(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE topics SET status = 'used', used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool().await?)
            .await?;
        Ok(())
    }

    async fn log_publication(
        &self,
        post_id: Option<i64>,
        status: LogStatus,
        error_message: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO publication_log (post_id, status, error_message) VALUES ($1, $2, $3)",
        )
        .bind(post_id)
        .bind(status.as_str())
        .bind(error_message)
        .execute(self.pool().await?)
        .await?;
        Ok(())
    }

    async fn publication_logs(&self, limit: i64) -> Result<Vec<PublicationLogRow>, AppError> {
        let rows = sqlx::query_as::<_, PublicationLogRow>(
            "SELECT * FROM publication_log ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool().await?)
        .await?;
        Ok(rows)
    }

    async fn create_social_posts(
        &self,
        blog_post_id: i64,
        posts: Vec<NewSocialPost>,
    ) -> Result<Vec<SocialPostRow>, AppError> {
        let mut tx = self.pool().await?.begin().await?;
        let mut rows = Vec::with_capacity(posts.len());

        for post in posts {
            let row = sqlx::query_as::<_, SocialPostRow>(
                r#"
                INSERT INTO social_media_posts (blog_post_id, platform, content, hashtags)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(blog_post_id)
            .bind(post.platform.as_str())
            .bind(&post.content)
            .bind(&post.hashtags)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    async fn social_posts(&self, blog_post_id: i64) -> Result<Vec<SocialPostRow>, AppError> {
        let rows = sqlx::query_as::<_, SocialPostRow>(
            "SELECT * FROM social_media_posts WHERE blog_post_id = $1 ORDER BY id",
        )
        .bind(blog_post_id)
        .fetch_all(self.pool().await?)
        .await?;
        Ok(rows)
    }

    async fn config_map(&self) -> Result<BTreeMap<String, String>, AppError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM configuration")
            .fetch_all(self.pool().await?)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO configuration (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.pool().await?)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_database_is_external_service() {
        let store = PgStore::new(Database::new("not-a-database-url"));

        let result = store.get_post(1).await;

        assert!(matches!(
            result,
            Err(AppError::ExternalService { ref service, .. }) if service == "postgres"
        ));
    }
}
