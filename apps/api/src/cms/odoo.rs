//! Odoo REST client (`{base}/api/v1/...`, bearer API key).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{CmsCategory, CmsClient, CmsConnector, CmsError, CmsProduct, CmsSettings};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OdooClient {
    client: Client,
    api_base: String,
}

impl OdooClient {
    pub fn new(settings: &CmsSettings) -> Result<Self, CmsError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.api_key)).map_err(|_| {
            CmsError::InvalidConfig {
                key: super::KEY_API_KEY,
                value: "<redacted>".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        if let Ok(db) = HeaderValue::from_str(&settings.database) {
            headers.insert("X-Odoo-Database", db);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: format!("{}/api/v1", settings.base_url),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, CmsError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CmsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| CmsError::Rejected(format!("unparseable response: {e}")))
    }
}

#[async_trait]
impl CmsClient for OdooClient {
    async fn test_connection(&self) -> Result<(), CmsError> {
        self.send(self.client.get(self.url("/version"))).await?;
        Ok(())
    }

    async fn products(&self, limit: usize) -> Result<Vec<CmsProduct>, CmsError> {
        let body = self
            .send(self.client.get(self.url("/records/product.template")).query(&[
                ("limit", limit.to_string()),
                (
                    "fields",
                    "id,name,description,categ_id,list_price".to_string(),
                ),
            ]))
            .await?;
        let products = parse_products(&body);
        debug!("Fetched {} products from Odoo", products.len());
        Ok(products)
    }

    async fn categories(&self) -> Result<Vec<CmsCategory>, CmsError> {
        let body = self
            .send(
                self.client
                    .get(self.url("/records/product.category"))
                    .query(&[("fields", "id,name,complete_name")]),
            )
            .await?;
        Ok(parse_categories(&body))
    }

    async fn create_post(
        &self,
        title: &str,
        html: &str,
        meta_description: &str,
        blog_id: i64,
    ) -> Result<i64, CmsError> {
        let payload = json!({
            "name": title,
            "content": html,
            "blog_id": blog_id,
            "tag_ids": [],
            "meta_description": meta_description,
            "is_published": false,
        });
        let body = self
            .send(self.client.post(self.url("/records/blog.post")).json(&payload))
            .await?;

        let id = body
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| CmsError::Rejected("blog post created without an id".to_string()))?;
        info!(odoo_post_id = id, "Created Odoo blog post");
        Ok(id)
    }

    async fn publish(&self, external_id: i64) -> Result<(), CmsError> {
        self.send(
            self.client
                .put(self.url(&format!("/records/blog.post/{external_id}")))
                .json(&json!({ "is_published": true })),
        )
        .await?;
        Ok(())
    }
}

/// Production connector: builds an `OdooClient` and checks `/version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdooConnector;

#[async_trait]
impl CmsConnector for OdooConnector {
    async fn connect(&self, settings: &CmsSettings) -> Result<Box<dyn CmsClient>, CmsError> {
        let client = OdooClient::new(settings)?;
        if let Err(e) = client.test_connection().await {
            warn!(url = %settings.base_url, "Odoo connection test failed: {e}");
            return Err(e);
        }
        info!(url = %settings.base_url, "Connected to Odoo");
        Ok(Box::new(client))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response parsing
// ────────────────────────────────────────────────────────────────────────────

/// Accepts a bare array or `{"records": [...]}`.
fn records(body: &Value) -> &[Value] {
    body.as_array()
        .or_else(|| body.get("records").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Records without an id or a name are skipped. `categ_id` is Odoo's
/// many2one pair `[id, "display name"]`.
pub fn parse_products(body: &Value) -> Vec<CmsProduct> {
    records(body)
        .iter()
        .filter_map(|item| {
            let id = item.get("id")?.as_i64()?;
            let name = item.get("name")?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(CmsProduct {
                id,
                name: name.to_string(),
                description: text_field(item, "description"),
                category: item
                    .get("categ_id")
                    .and_then(|c| c.get(1))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                price: item
                    .get("list_price")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            })
        })
        .collect()
}

/// Prefers `complete_name` (full path) over `name`.
pub fn parse_categories(body: &Value) -> Vec<CmsCategory> {
    records(body)
        .iter()
        .filter_map(|item| {
            let id = item.get("id")?.as_i64()?;
            let name = item
                .get("complete_name")
                .and_then(Value::as_str)
                .filter(|n| !n.trim().is_empty())
                .or_else(|| item.get("name").and_then(Value::as_str))?;
            Some(CmsCategory {
                id,
                name: name.trim().to_string(),
            })
        })
        .collect()
}
