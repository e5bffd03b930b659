//! Provider adapters: one `ArticleWriter` call per vendor per cycle.
//!
//! The production writer is `LlmClient`; tests substitute fakes through the
//! same trait, which is all the parallel generator depends on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generation::outline::ArticleOutline;
use crate::generation::prompts::{build_article_prompt, ARTICLE_SYSTEM};
use crate::generation::text::raw_word_count;
use crate::llm_client::{strip_code_fences, LlmClient, LlmError, LlmReply, Provider};

/// One provider's article for one cycle. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArticle {
    pub title: String,
    /// HTML-formatted body.
    pub content: String,
    pub writer: Provider,
    pub word_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedArticle {
    pub fn new(outline: &ArticleOutline, writer: Provider, content: String) -> Self {
        Self {
            title: outline.topic.clone(),
            word_count: raw_word_count(&content),
            content,
            writer,
            generated_at: Utc::now(),
        }
    }
}

/// The provider adapter contract: outline + credential in, article text out.
/// Any failure (auth, rate limit, malformed response) is an `LlmError`.
#[async_trait]
pub trait ArticleWriter: Send + Sync {
    async fn write(
        &self,
        provider: Provider,
        outline: &ArticleOutline,
        api_key: &str,
    ) -> Result<LlmReply, LlmError>;
}

#[async_trait]
impl ArticleWriter for LlmClient {
    async fn write(
        &self,
        provider: Provider,
        outline: &ArticleOutline,
        api_key: &str,
    ) -> Result<LlmReply, LlmError> {
        let prompt = build_article_prompt(outline);
        let mut reply = self.call(provider, api_key, &prompt, ARTICLE_SYSTEM).await?;

        let html = strip_code_fences(&reply.text);
        if html.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        reply.text = html.to_string();
        Ok(reply)
    }
}
