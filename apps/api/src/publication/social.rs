//! Social post generation for approved articles: one post per platform,
//! written concurrently by the first configured LLM provider.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, ProviderCredentials};
use crate::models::social::{NewSocialPost, Platform};
use crate::publication::prompts::{build_social_prompt, platform_brief};

/// What the social copy is about.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialBrief {
    pub title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub url: String,
}

#[async_trait]
pub trait SocialWriter: Send + Sync {
    /// One post per platform in `Platform::ALL` order, or an error.
    async fn write_posts(&self, brief: &SocialBrief) -> Result<Vec<NewSocialPost>, AppError>;
}

#[derive(Debug, Deserialize)]
struct SocialReply {
    content: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

/// Normalises hashtags to `#tag` form and drops blanks.
fn clean_hashtags(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|h| h.trim().trim_start_matches('#').to_string())
        .filter(|h| !h.is_empty())
        .map(|h| format!("#{h}"))
        .collect()
}

pub struct LlmSocialWriter {
    llm: LlmClient,
    credentials: ProviderCredentials,
}

impl LlmSocialWriter {
    pub fn new(llm: LlmClient, credentials: ProviderCredentials) -> Self {
        Self { llm, credentials }
    }
}

#[async_trait]
impl SocialWriter for LlmSocialWriter {
    async fn write_posts(&self, brief: &SocialBrief) -> Result<Vec<NewSocialPost>, AppError> {
        let (provider, api_key) = self
            .credentials
            .configured()
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Configuration("No AI API keys configured".to_string()))?;

        let calls = Platform::ALL.into_iter().map(|platform| async move {
            let (role, _) = platform_brief(platform);
            let system = format!("{role} {JSON_ONLY_SYSTEM}");
            let prompt = build_social_prompt(platform, brief);
            let reply: SocialReply = self
                .llm
                .call_json(provider, api_key, &prompt, &system)
                .await
                .map_err(|e| AppError::external(provider.as_str(), e.to_string()))?;

            Ok::<_, AppError>(NewSocialPost {
                platform,
                content: reply.content.trim().to_string(),
                hashtags: clean_hashtags(reply.hashtags),
            })
        });

        let posts = try_join_all(calls).await?;
        info!(%provider, count = posts.len(), "Generated social media posts");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_hashtags() {
        let raw = vec![
            "#energia".to_string(),
            "moc bierna".to_string(),
            "  ".to_string(),
            "##svg".to_string(),
        ];
        assert_eq!(
            clean_hashtags(raw),
            vec!["#energia", "#moc bierna", "#svg"]
        );
    }

    #[test]
    fn test_reply_without_hashtags_parses() {
        let reply: SocialReply = serde_json::from_str(r#"{"content": "Nowy wpis!"}"#).unwrap();
        assert_eq!(reply.content, "Nowy wpis!");
        assert!(reply.hashtags.is_empty());
    }

    #[test]
    fn test_social_prompt_carries_brief() {
        let brief = SocialBrief {
            title: "Kompensacja mocy".to_string(),
            meta_description: "Krótki opis.".to_string(),
            keywords: vec!["moc bierna".to_string(), "svg".to_string()],
            url: "https://example.pl/blog/3".to_string(),
        };
        let prompt = build_social_prompt(Platform::Twitter, &brief);
        assert!(prompt.contains("Twitter/X"));
        assert!(prompt.contains("Tytuł artykułu: Kompensacja mocy"));
        assert!(prompt.contains("Słowa kluczowe: moc bierna, svg"));
        assert!(prompt.contains("URL: https://example.pl/blog/3"));
    }

    #[tokio::test]
    async fn test_no_credentials_is_a_configuration_error() {
        let writer = LlmSocialWriter::new(LlmClient::new(5).unwrap(), ProviderCredentials::default());
        let brief = SocialBrief {
            title: "T".to_string(),
            meta_description: String::new(),
            keywords: vec![],
            url: String::new(),
        };
        assert!(matches!(
            writer.write_posts(&brief).await,
            Err(AppError::Configuration(_))
        ));
    }
}
