//! Article lifecycle.
//!
//! ```text
//! draft(pending) ──approve──▶ draft(approved) ──claim──▶ publishing ──▶ published
//!       │                                                  │
//!       └──reject──▶ draft(rejected)   (terminal)          └─CMS error─▶ draft(approved)
//! ```
//!
//! Transitions are checked here for a readable error, then applied in the
//! store as a conditional update so concurrent requests cannot both win.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::post::{ApprovalStatus, BlogPostRow, PostStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleState {
    Pending,
    Approved,
    Rejected,
    /// Claimed by an in-flight publish.
    Publishing,
    Published,
}

impl ArticleState {
    pub fn of(post: &BlogPostRow) -> Result<Self, AppError> {
        let status: PostStatus = post
            .status
            .parse()
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        let approval: ApprovalStatus = post
            .approval_status
            .parse()
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

        Ok(match (status, approval) {
            (PostStatus::Published, _) => ArticleState::Published,
            (PostStatus::Publishing, _) => ArticleState::Publishing,
            (_, ApprovalStatus::Pending) => ArticleState::Pending,
            (_, ApprovalStatus::Approved) => ArticleState::Approved,
            (_, ApprovalStatus::Rejected) => ArticleState::Rejected,
        })
    }

    pub fn approve(self) -> Result<Self, AppError> {
        match self {
            ArticleState::Pending => Ok(ArticleState::Approved),
            other => Err(other.refuse("approve")),
        }
    }

    pub fn reject(self) -> Result<Self, AppError> {
        match self {
            ArticleState::Pending => Ok(ArticleState::Rejected),
            other => Err(other.refuse("reject")),
        }
    }

    pub fn publish(self) -> Result<Self, AppError> {
        match self {
            ArticleState::Approved => Ok(ArticleState::Published),
            other => Err(other.refuse("publish")),
        }
    }

    fn refuse(self, action: &str) -> AppError {
        AppError::InvalidState(format!("cannot {action} a post that is {}", self.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleState::Pending => "pending",
            ArticleState::Approved => "approved",
            ArticleState::Rejected => "rejected",
            ArticleState::Publishing => "publishing",
            ArticleState::Published => "published",
        }
    }
}
