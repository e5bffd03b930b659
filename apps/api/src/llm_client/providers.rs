//! Vendor wire formats. One closed enum covers every supported writer;
//! adding a vendor means adding a variant and its request/response shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::LlmError;

const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.7;

/// An LLM vendor able to write articles.
///
/// Declaration order is provider priority: it fixes both dispatch order and
/// the order of results handed to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "chatgpt")]
    OpenAi,
    #[serde(rename = "claude")]
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Gemini, Provider::OpenAi, Provider::Anthropic];

    /// Stable tag used in the database and in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "chatgpt",
            Provider::Anthropic => "claude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "ChatGPT",
            Provider::Anthropic => "Claude",
        }
    }

    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash-exp",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    pub(crate) fn request(
        &self,
        client: &reqwest::Client,
        api_key: &str,
        system: &str,
        prompt: &str,
    ) -> reqwest::RequestBuilder {
        match self {
            Provider::Gemini => {
                let url = format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                    self.model()
                );
                client.post(url).query(&[("key", api_key)]).json(&json!({
                    "systemInstruction": { "parts": [{ "text": system }] },
                    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                    "generationConfig": {
                        "temperature": TEMPERATURE,
                        "maxOutputTokens": MAX_TOKENS
                    }
                }))
            }
            Provider::OpenAi => client
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(api_key)
                .json(&json!({
                    "model": self.model(),
                    "messages": [
                        { "role": "system", "content": system },
                        { "role": "user", "content": prompt }
                    ],
                    "temperature": TEMPERATURE,
                    "max_tokens": MAX_TOKENS
                })),
            Provider::Anthropic => client
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&json!({
                    "model": self.model(),
                    "max_tokens": MAX_TOKENS,
                    "system": system,
                    "messages": [{ "role": "user", "content": prompt }]
                })),
        }
    }

    /// Extracts the generated text and token usage from a successful response body.
    pub(crate) fn parse_reply(&self, body: Value) -> Result<LlmReply, LlmError> {
        let reply = match self {
            Provider::Gemini => {
                let response: GeminiResponse = serde_json::from_value(body)?;
                let text = response
                    .candidates
                    .into_iter()
                    .next()
                    .map(|c| {
                        c.content
                            .parts
                            .into_iter()
                            .filter_map(|p| p.text)
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                LlmReply {
                    text,
                    input_tokens: response
                        .usage_metadata
                        .as_ref()
                        .and_then(|u| u.prompt_token_count),
                    output_tokens: response
                        .usage_metadata
                        .and_then(|u| u.candidates_token_count),
                }
            }
            Provider::OpenAi => {
                let response: OpenAiResponse = serde_json::from_value(body)?;
                LlmReply {
                    text: response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .unwrap_or_default(),
                    input_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
                    output_tokens: response.usage.map(|u| u.completion_tokens),
                }
            }
            Provider::Anthropic => {
                let response: AnthropicResponse = serde_json::from_value(body)?;
                LlmReply {
                    text: response
                        .content
                        .into_iter()
                        .find(|b| b.block_type == "text")
                        .and_then(|b| b.text)
                        .unwrap_or_default(),
                    input_tokens: response.usage.as_ref().map(|u| u.input_tokens),
                    output_tokens: response.usage.map(|u| u.output_tokens),
                }
            }
        };

        if reply.text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(reply)
    }

    /// Pulls a human-readable message out of a vendor error body, falling back to the raw body.
    pub(crate) fn error_message(&self, body: String) -> String {
        serde_json::from_str::<VendorError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "chatgpt" | "openai" => Ok(Provider::OpenAi),
            "claude" | "anthropic" => Ok(Provider::Anthropic),
            other => Err(format!("unknown writer '{other}'")),
        }
    }
}

/// Text plus usage counters returned by any vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmReply {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// API keys per provider. Absent means "not configured".
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    keys: Vec<(Provider, String)>,
}

impl ProviderCredentials {
    pub fn set(&mut self, provider: Provider, key: impl Into<String>) {
        let key = key.into();
        match self.keys.iter_mut().find(|(p, _)| *p == provider) {
            Some(slot) => slot.1 = key,
            None => self.keys.push((provider, key)),
        }
    }

    pub fn with(mut self, provider: Provider, key: impl Into<String>) -> Self {
        self.set(provider, key);
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.keys
            .iter()
            .find(|(p, k)| *p == provider && !k.trim().is_empty())
            .map(|(_, k)| k.as_str())
    }

    /// Configured providers with their keys, in priority order.
    pub fn configured(&self) -> Vec<(Provider, &str)> {
        Provider::ALL
            .iter()
            .filter_map(|p| self.get(*p).map(|k| (*p, k)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.configured().is_empty()
    }
}

// Keys must never reach the logs.
impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self
            .configured()
            .into_iter()
            .map(|(p, _)| p.as_str())
            .collect();
        f.debug_struct("ProviderCredentials")
            .field("configured", &names)
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    error: VendorErrorBody,
}

#[derive(Debug, Deserialize)]
struct VendorErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_is_gemini_chatgpt_claude() {
        assert_eq!(
            Provider::ALL,
            [Provider::Gemini, Provider::OpenAi, Provider::Anthropic]
        );
    }

    #[test]
    fn test_provider_tags_round_trip_through_from_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("mistral".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_serde_uses_writer_tags() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), r#""chatgpt""#);
        let p: Provider = serde_json::from_str(r#""claude""#).unwrap();
        assert_eq!(p, Provider::Anthropic);
    }

    #[test]
    fn test_parse_gemini_reply_joins_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "<h2>A</h2>" }, { "text": "<p>B</p>" }] } }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 40 }
        });
        let reply = Provider::Gemini.parse_reply(body).unwrap();
        assert_eq!(reply.text, "<h2>A</h2><p>B</p>");
        assert_eq!(reply.input_tokens, Some(12));
        assert_eq!(reply.output_tokens, Some(40));
    }

    #[test]
    fn test_parse_openai_reply() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "<p>Hello</p>" } }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12 }
        });
        let reply = Provider::OpenAi.parse_reply(body).unwrap();
        assert_eq!(reply.text, "<p>Hello</p>");
        assert_eq!(reply.output_tokens, Some(7));
    }

    #[test]
    fn test_parse_anthropic_reply_skips_non_text_blocks() {
        let body = json!({
            "content": [{ "type": "thinking" }, { "type": "text", "text": "<p>Hi</p>" }],
            "usage": { "input_tokens": 3, "output_tokens": 4 }
        });
        let reply = Provider::Anthropic.parse_reply(body).unwrap();
        assert_eq!(reply.text, "<p>Hi</p>");
    }

    #[test]
    fn test_empty_reply_is_an_error() {
        let body = json!({ "choices": [] });
        assert!(matches!(
            Provider::OpenAi.parse_reply(body),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_malformed_reply_is_a_parse_error() {
        let body = json!({ "choices": "nope" });
        assert!(matches!(
            Provider::OpenAi.parse_reply(body),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_error_message_extracts_vendor_message() {
        let body = r#"{"error":{"message":"invalid x-api-key","type":"authentication_error"}}"#;
        assert_eq!(
            Provider::Anthropic.error_message(body.to_string()),
            "invalid x-api-key"
        );
        assert_eq!(Provider::Gemini.error_message("boom".to_string()), "boom");
    }

    #[test]
    fn test_credentials_ignore_blank_keys_and_keep_priority_order() {
        let creds = ProviderCredentials::default()
            .with(Provider::Anthropic, "sk-ant")
            .with(Provider::OpenAi, "  ")
            .with(Provider::Gemini, "g-key");
        let configured: Vec<_> = creds.configured().into_iter().map(|(p, _)| p).collect();
        assert_eq!(configured, vec![Provider::Gemini, Provider::Anthropic]);
        assert!(creds.get(Provider::OpenAi).is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_keys() {
        let creds = ProviderCredentials::default().with(Provider::OpenAi, "sk-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("chatgpt"));
    }
}
