//! Selector: optimizes every candidate article and picks the winner.
//!
//! No LLM calls. Each article is scored, given a meta description and
//! internal product links, then ranked by total score. Ranking is a stable
//! sort, so equal scores keep provider-priority order.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::scoring::{ArticleScore, ArticleScorer};
use crate::generation::text::{sentences, strip_html};
use crate::generation::writers::GeneratedArticle;

/// Longest meta description search engines display without truncation.
pub const META_DESCRIPTION_MAX: usize = 160;

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A generated article plus everything the optimizer derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedArticle {
    #[serde(flatten)]
    pub article: GeneratedArticle,
    pub meta_description: String,
    /// `content` with internal product links inserted.
    pub optimized_content: String,
    /// Products that were actually linked.
    pub internal_links: Vec<String>,
    pub score: ArticleScore,
}

/// The winner and the remaining candidates, both in rank order.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub best: OptimizedArticle,
    pub alternatives: Vec<OptimizedArticle>,
}

// ────────────────────────────────────────────────────────────────────────────
// Optimization
// ────────────────────────────────────────────────────────────────────────────

/// First two sentences of the plain text, capped at 160 characters
/// (157 plus an ellipsis when longer). Empty when there is no sentence.
pub fn generate_meta_description(content: &str) -> String {
    let plain = strip_html(content);
    let parts = sentences(&plain);
    let Some(first) = parts.first() else {
        return String::new();
    };
    let second = parts.get(1).copied().unwrap_or_default();

    let description = format!("{first}. {second}").trim().to_string();
    if description.chars().count() <= META_DESCRIPTION_MAX {
        return description;
    }

    let mut truncated: String = description
        .chars()
        .take(META_DESCRIPTION_MAX - 3)
        .collect();
    truncated.push_str("...");
    truncated
}

/// URL slug for a product name: lowercase, whitespace runs become `-`.
pub fn product_slug(product: &str) -> String {
    WHITESPACE_REGEX
        .replace_all(product.trim(), "-")
        .to_lowercase()
}

/// Links the first whole-word, case-insensitive occurrence of each product.
///
/// Occurrences inside a tag or inside an existing anchor are skipped.
/// Returns the new content and the products that were linked.
pub fn add_internal_links(content: &str, related_products: &[String]) -> (String, Vec<String>) {
    let mut linked_content = content.to_string();
    let mut linked = Vec::new();

    for product in related_products {
        let product = product.trim();
        if product.is_empty() {
            continue;
        }
        let Ok(pattern) = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(product)))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };

        let target = pattern
            .find_iter(&linked_content)
            .map(|m| m.range())
            .find(|range| !is_inside_markup(&linked_content, range.start));

        if let Some(range) = target {
            let anchor = format!(
                r#"<a href="/products/{}">{}</a>"#,
                product_slug(product),
                product
            );
            linked_content.replace_range(range, &anchor);
            linked.push(product.to_string());
        }
    }

    (linked_content, linked)
}

/// True when `pos` falls within a tag or between `<a ...>` and `</a>`.
fn is_inside_markup(html: &str, pos: usize) -> bool {
    let before = &html[..pos];
    let last_open = before.rfind('<');
    let last_close = before.rfind('>');
    if last_open > last_close {
        return true;
    }

    let lowered = before.to_ascii_lowercase();
    let anchor_open = lowered.rfind("<a ").max(lowered.rfind("<a>"));
    let anchor_close = lowered.rfind("</a>");
    anchor_open > anchor_close
}

pub fn optimize_article(
    scorer: &ArticleScorer,
    article: GeneratedArticle,
    keywords: &[String],
    related_products: &[String],
) -> OptimizedArticle {
    let score = scorer.evaluate(&article, keywords);
    let meta_description = generate_meta_description(&article.content);
    let (optimized_content, internal_links) =
        add_internal_links(&article.content, related_products);

    OptimizedArticle {
        article,
        meta_description,
        optimized_content,
        internal_links,
        score,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Optimizes every article and sorts by total score, highest first.
/// Ties keep input order.
pub fn rank_articles(
    scorer: &ArticleScorer,
    articles: Vec<GeneratedArticle>,
    keywords: &[String],
    related_products: &[String],
) -> Vec<OptimizedArticle> {
    let mut ranked: Vec<OptimizedArticle> = articles
        .into_iter()
        .map(|article| optimize_article(scorer, article, keywords, related_products))
        .collect();

    // Vec::sort_by is stable.
    ranked.sort_by(|a, b| b.score.total_score.cmp(&a.score.total_score));

    for candidate in &ranked {
        debug!(
            writer = %candidate.article.writer,
            total = candidate.score.total_score,
            seo = candidate.score.seo_score,
            readability = candidate.score.readability_score,
            engagement = candidate.score.engagement_score,
            "Article scored"
        );
    }

    ranked
}

pub fn select(
    scorer: &ArticleScorer,
    articles: Vec<GeneratedArticle>,
    keywords: &[String],
    related_products: &[String],
) -> Result<Selection, AppError> {
    let mut ranked = rank_articles(scorer, articles, keywords, related_products).into_iter();
    let best = ranked.next().ok_or(AppError::NoArticles)?;

    info!(
        writer = %best.article.writer,
        score = best.score.total_score,
        "Selected best article"
    );

    Ok(Selection {
        best,
        alternatives: ranked.collect(),
    })
}

pub fn select_best(
    scorer: &ArticleScorer,
    articles: Vec<GeneratedArticle>,
    keywords: &[String],
) -> Result<OptimizedArticle, AppError> {
    select(scorer, articles, keywords, &[]).map(|selection| selection.best)
}
