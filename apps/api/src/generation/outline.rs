//! Article outline: the brief handed to every writer in one cycle, plus the
//! boundary parse that turns an untyped request body into one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_TARGET_LENGTH: u32 = 1500;

/// Product line an article belongs to. Unknown tags fall back to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "kompensacja_mocy_biernej")]
    ReactivePowerCompensation,
    #[serde(rename = "kompensatory_svg")]
    SvgCompensators,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ReactivePowerCompensation => "kompensacja_mocy_biernej",
            Category::SvgCompensators => "kompensatory_svg",
        }
    }

    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Category::ReactivePowerCompensation => "Kompensacja mocy biernej",
            Category::SvgCompensators => "Kompensatory SVG",
        }
    }

    /// Lenient tag lookup: anything unrecognised maps to the default category.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "kompensatory_svg" => Category::SvgCompensators,
            _ => Category::ReactivePowerCompensation,
        }
    }

    /// Infers the category from a product or category name.
    pub fn infer_from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("svg") || lower.contains("kompensator") {
            Category::SvgCompensators
        } else {
            Category::ReactivePowerCompensation
        }
    }
}

/// Immutable input to generation, shared read-only by all concurrent writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleOutline {
    pub topic: String,
    /// Never empty once constructed through `from_payload`.
    pub keywords: Vec<String>,
    pub target_length: u32,
    pub sections: Vec<String>,
    #[serde(default)]
    pub category: Category,
}

#[derive(Debug, Error, PartialEq)]
pub enum OutlineError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("topic is required and must be a non-empty string")]
    MissingTopic,

    #[error("keywords are required and must be a non-empty array")]
    MissingKeywords,

    #[error("keywords[{0}] must be a non-empty string")]
    InvalidKeyword(usize),
}

impl ArticleOutline {
    /// Validates an inbound payload and produces a typed outline.
    ///
    /// Required: `topic`, `keywords`. Optional fields degrade to defaults
    /// instead of failing: `targetLength` (1500), `sections` (empty),
    /// `category` (reactive power compensation).
    pub fn from_payload(body: &Value) -> Result<Self, OutlineError> {
        let obj = body.as_object().ok_or(OutlineError::NotAnObject)?;

        let topic = obj
            .get("topic")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(OutlineError::MissingTopic)?
            .to_string();

        let raw_keywords = obj
            .get("keywords")
            .and_then(Value::as_array)
            .filter(|k| !k.is_empty())
            .ok_or(OutlineError::MissingKeywords)?;
        let keywords = raw_keywords
            .iter()
            .enumerate()
            .map(|(i, k)| {
                k.as_str()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .ok_or(OutlineError::InvalidKeyword(i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let target_length = obj
            .get("targetLength")
            .and_then(Value::as_u64)
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_TARGET_LENGTH);

        let sections = obj
            .get("sections")
            .and_then(Value::as_array)
            .map(|s| {
                s.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let category = obj
            .get("category")
            .and_then(Value::as_str)
            .map(Category::from_tag)
            .unwrap_or_default();

        Ok(ArticleOutline {
            topic,
            keywords,
            target_length,
            sections,
            category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_payload_gets_defaults() {
        let outline =
            ArticleOutline::from_payload(&json!({ "topic": "X", "keywords": ["x", "y"] }))
                .unwrap();
        assert_eq!(outline.topic, "X");
        assert_eq!(outline.keywords, vec!["x", "y"]);
        assert_eq!(outline.target_length, DEFAULT_TARGET_LENGTH);
        assert!(outline.sections.is_empty());
        assert_eq!(outline.category, Category::ReactivePowerCompensation);
    }

    #[test]
    fn test_full_payload_is_respected() {
        let outline = ArticleOutline::from_payload(&json!({
            "topic": "SVG guide",
            "keywords": ["svg"],
            "targetLength": 2200,
            "sections": ["A", "B"],
            "category": "kompensatory_svg"
        }))
        .unwrap();
        assert_eq!(outline.target_length, 2200);
        assert_eq!(outline.sections, vec!["A", "B"]);
        assert_eq!(outline.category, Category::SvgCompensators);
    }

    #[test]
    fn test_invalid_optionals_fall_back() {
        let outline = ArticleOutline::from_payload(&json!({
            "topic": "X",
            "keywords": ["x"],
            "targetLength": "long",
            "sections": "A, B",
            "category": "gardening"
        }))
        .unwrap();
        assert_eq!(outline.target_length, DEFAULT_TARGET_LENGTH);
        assert!(outline.sections.is_empty());
        assert_eq!(outline.category, Category::ReactivePowerCompensation);
    }

    #[test]
    fn test_missing_topic_rejected() {
        assert_eq!(
            ArticleOutline::from_payload(&json!({ "keywords": ["x"] })),
            Err(OutlineError::MissingTopic)
        );
        assert_eq!(
            ArticleOutline::from_payload(&json!({ "topic": "   ", "keywords": ["x"] })),
            Err(OutlineError::MissingTopic)
        );
        assert_eq!(
            ArticleOutline::from_payload(&json!({ "topic": 7, "keywords": ["x"] })),
            Err(OutlineError::MissingTopic)
        );
    }

    #[test]
    fn test_empty_keywords_rejected() {
        assert_eq!(
            ArticleOutline::from_payload(&json!({ "topic": "X", "keywords": [] })),
            Err(OutlineError::MissingKeywords)
        );
        assert_eq!(
            ArticleOutline::from_payload(&json!({ "topic": "X" })),
            Err(OutlineError::MissingKeywords)
        );
    }

    #[test]
    fn test_non_string_keyword_reports_index() {
        assert_eq!(
            ArticleOutline::from_payload(&json!({ "topic": "X", "keywords": ["x", 3] })),
            Err(OutlineError::InvalidKeyword(1))
        );
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert_eq!(
            ArticleOutline::from_payload(&json!(["X"])),
            Err(OutlineError::NotAnObject)
        );
    }

    #[test]
    fn test_category_inference() {
        assert_eq!(
            Category::infer_from_name("Kompensator SVG 100 kvar"),
            Category::SvgCompensators
        );
        assert_eq!(
            Category::infer_from_name("Baterie kondensatorów"),
            Category::ReactivePowerCompensation
        );
    }
}
