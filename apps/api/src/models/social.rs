use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Social network a promotional post is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Facebook,
    Twitter,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::LinkedIn,
        Platform::Facebook,
        Platform::Twitter,
        Platform::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialPostRow {
    pub id: i64,
    pub blog_post_id: i64,
    pub platform: String,
    pub content: String,
    pub hashtags: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Generated social copy, stored as a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSocialPost {
    pub platform: Platform,
    pub content: String,
    pub hashtags: Vec<String>,
}
