/// LLM Client: the single point of entry for every vendor call in Blogwright.
///
/// ARCHITECTURAL RULE: No other module may call a vendor API directly.
/// Article writers, social post generation and any future LLM use go through here.
///
/// Models are fixed per provider in `providers.rs` to prevent drift.
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod providers;

pub use providers::{LlmReply, Provider, ProviderCredentials};

const MAX_RETRIES: u32 = 3;

/// Longest single attempt that still lets every retry and its backoff
/// finish inside `call_budget_secs`.
pub fn attempt_timeout_secs(call_budget_secs: u64) -> u64 {
    let backoff: u64 = (1..MAX_RETRIES).map(|attempt| 1u64 << (attempt - 1)).sum();
    (call_budget_secs.saturating_sub(backoff) / u64::from(MAX_RETRIES)).max(1)
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// The single LLM client used by all services in Blogwright.
/// Wraps every vendor behind one `call` with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
}

impl LlmClient {
    /// `timeout_secs` bounds a single HTTP attempt; callers bound the whole call.
    pub fn new(timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
        })
    }

    /// Makes a raw call to one vendor, returning the extracted text.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<LlmReply, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    %provider,
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match provider
                .request(&self.client, api_key, system, prompt)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(%provider, "LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: provider.error_message(body),
                });
            }

            let body: serde_json::Value = response.json().await?;
            let reply = provider.parse_reply(body)?;

            debug!(
                %provider,
                "LLM call succeeded: input_tokens={:?}, output_tokens={:?}",
                reply.input_tokens,
                reply.output_tokens
            );

            return Ok(reply);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let reply = self.call(provider, api_key, prompt, system).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_code_fences(&reply.text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json / ```html / bare ``` code fences from LLM output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) if !rest[..idx].trim().contains(' ') => &rest[idx + 1..],
        _ => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(rest.trim())
}
