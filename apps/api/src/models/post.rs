use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UnknownVariant;
use crate::generation::selector::OptimizedArticle;

/// Reviewer decision on a generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(UnknownVariant::new("approval status", other)),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the post is live on the CMS. `Publishing` is held by exactly one
/// publish attempt between the claim and the CMS result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Publishing,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publishing => "publishing",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

impl FromStr for PostStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "publishing" => Ok(PostStatus::Publishing),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            other => Err(UnknownVariant::new("post status", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPostRow {
    pub id: i64,
    pub odoo_post_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub ai_writer: String,
    pub seo_score: Option<i32>,
    pub readability_score: Option<i32>,
    pub engagement_score: Option<i32>,
    pub total_score: Option<i32>,
    pub status: String,
    pub approval_status: String,
    pub rejection_reason: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a freshly selected article. Always starts as
/// `draft` / `pending`.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub ai_writer: String,
    pub seo_score: i32,
    pub readability_score: i32,
    pub engagement_score: i32,
    pub total_score: i32,
}

impl NewBlogPost {
    /// The stored body is the optimized content, internal links included.
    pub fn from_optimized(article: &OptimizedArticle, keywords: &[String]) -> Self {
        let score = &article.score;
        Self {
            title: article.article.title.clone(),
            content: article.optimized_content.clone(),
            meta_description: article.meta_description.clone(),
            keywords: keywords.to_vec(),
            ai_writer: article.article.writer.as_str().to_string(),
            seo_score: score.seo_score as i32,
            readability_score: score.readability_score as i32,
            engagement_score: score.engagement_score as i32,
            total_score: score.total_score as i32,
        }
    }
}
