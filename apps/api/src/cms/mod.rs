//! CMS seam. The publication workflow only talks to `CmsClient`; the Odoo
//! REST implementation lives in `odoo.rs`.

pub mod odoo;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;

pub use odoo::OdooConnector;

pub const KEY_URL: &str = "odoo_url";
pub const KEY_API_KEY: &str = "odoo_api_key";
pub const KEY_DATABASE: &str = "odoo_database";
pub const KEY_BLOG_ID: &str = "odoo_blog_id";

const DEFAULT_DATABASE: &str = "odoo";

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("CMS configuration missing '{0}'")]
    MissingConfig(&'static str),

    #[error("CMS configuration '{key}' is invalid: {value}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("CMS rejected the request: {0}")]
    Rejected(String),
}

impl From<CmsError> for AppError {
    fn from(e: CmsError) -> Self {
        match e {
            CmsError::MissingConfig(_) | CmsError::InvalidConfig { .. } => {
                AppError::Configuration(e.to_string())
            }
            other => AppError::external("odoo", other.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Category display name, empty when uncategorised.
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsCategory {
    pub id: i64,
    pub name: String,
}

/// Connection settings, read from the persisted configuration map.
#[derive(Debug, Clone, PartialEq)]
pub struct CmsSettings {
    pub base_url: String,
    pub api_key: String,
    pub database: String,
    pub blog_id: i64,
}

impl CmsSettings {
    pub fn from_config(config: &BTreeMap<String, String>) -> Result<Self, CmsError> {
        let required = |key: &'static str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or(CmsError::MissingConfig(key))
        };

        let raw_blog_id = required(KEY_BLOG_ID)?;
        let blog_id = raw_blog_id
            .parse::<i64>()
            .map_err(|_| CmsError::InvalidConfig {
                key: KEY_BLOG_ID,
                value: raw_blog_id.to_string(),
            })?;

        Ok(Self {
            base_url: required(KEY_URL)?.trim_end_matches('/').to_string(),
            api_key: required(KEY_API_KEY)?.to_string(),
            database: required(KEY_DATABASE)
                .unwrap_or(DEFAULT_DATABASE)
                .to_string(),
            blog_id,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Contracts
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait CmsClient: Send + Sync {
    async fn test_connection(&self) -> Result<(), CmsError>;
    async fn products(&self, limit: usize) -> Result<Vec<CmsProduct>, CmsError>;
    async fn categories(&self) -> Result<Vec<CmsCategory>, CmsError>;
    /// Creates an unpublished post and returns its CMS id.
    async fn create_post(
        &self,
        title: &str,
        html: &str,
        meta_description: &str,
        blog_id: i64,
    ) -> Result<i64, CmsError>;
    async fn publish(&self, external_id: i64) -> Result<(), CmsError>;
}

/// Builds clients from settings. `connect` must verify the connection.
#[async_trait]
pub trait CmsConnector: Send + Sync {
    async fn connect(&self, settings: &CmsSettings) -> Result<Box<dyn CmsClient>, CmsError>;
}
