use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::generation::outline::{ArticleOutline, Category};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopicRow {
    pub id: i64,
    pub topic_name: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub seo_difficulty: i32,
    pub related_products: Vec<String>,
    pub outline: Json<ArticleOutline>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
    pub topic_name: String,
    pub category: Category,
    pub keywords: Vec<String>,
    pub seo_difficulty: i32,
    pub related_products: Vec<String>,
    pub outline: ArticleOutline,
}
