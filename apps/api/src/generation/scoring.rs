//! Article Scoring: deterministic SEO / readability / engagement evaluation.
//!
//! Pure-Rust, no LLM call, no I/O. Given the same article and keywords the
//! score is always identical, which is what makes selection reproducible.
//!
//! Weights: SEO 30%, readability 30%, engagement 40%.

use serde::{Deserialize, Serialize};

use crate::generation::text::{sentences, strip_html};
use crate::generation::writers::GeneratedArticle;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Raw measurements behind the sub-scores, kept for transparency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetails {
    /// Percentage, 0.0 upwards. Substring matches, not whole words.
    pub keyword_density: f64,
    pub heading_structure: bool,
    /// The article's raw word count (markup tokens included).
    pub content_length: usize,
    pub avg_sentence_length: f64,
    pub paragraph_count: usize,
    pub has_call_to_action: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleScore {
    pub seo_score: u32,         // 0 – 100
    pub readability_score: u32, // 0 – 100
    pub engagement_score: u32,  // 0 – 100
    pub total_score: u32,       // 0 – 100, weighted
    pub details: ScoreDetails,
}

// ────────────────────────────────────────────────────────────────────────────
// Call-to-action lexicon
// ────────────────────────────────────────────────────────────────────────────

/// Language of the call-to-action phrase set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaLocale {
    #[default]
    Pl,
    En,
}

const CTA_PHRASES_PL: &[&str] = &[
    "skontaktuj się",
    "dowiedz się więcej",
    "sprawdź",
    "kup teraz",
    "zamów",
    "zadzwoń",
    "napisz do nas",
];

const CTA_PHRASES_EN: &[&str] = &[
    "contact us",
    "learn more",
    "buy now",
    "order now",
    "call us",
    "get in touch",
    "check out",
];

impl CtaLocale {
    /// Unknown codes fall back to Polish, the language articles are written in.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => CtaLocale::En,
            _ => CtaLocale::Pl,
        }
    }

    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            CtaLocale::Pl => CTA_PHRASES_PL,
            CtaLocale::En => CTA_PHRASES_EN,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer
// ────────────────────────────────────────────────────────────────────────────

/// Stateless evaluator parameterised only by the CTA locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleScorer {
    locale: CtaLocale,
}

impl ArticleScorer {
    pub fn new(locale: CtaLocale) -> Self {
        Self { locale }
    }

    pub fn evaluate(&self, article: &GeneratedArticle, keywords: &[String]) -> ArticleScore {
        let content = article.content.as_str();
        let plain = strip_html(content);

        let details = ScoreDetails {
            keyword_density: keyword_density(&plain, keywords),
            heading_structure: has_heading_structure(content),
            content_length: article.word_count,
            avg_sentence_length: avg_sentence_length(&plain),
            paragraph_count: count_paragraphs(content),
            has_call_to_action: has_call_to_action(&plain, self.locale),
        };

        let seo_score = seo_score(&details);
        let readability_score = readability_score(&details, has_list(content));
        let engagement_score = engagement_score(
            details.has_call_to_action,
            count_questions(content),
            has_emphasis(content),
        );

        ArticleScore {
            seo_score,
            readability_score,
            engagement_score,
            total_score: total_score(seo_score, readability_score, engagement_score),
            details,
        }
    }
}

/// round(0.3·seo + 0.3·readability + 0.4·engagement), half rounding up.
///
/// Computed in integer tenths so the result never depends on float error.
pub fn total_score(seo: u32, readability: u32, engagement: u32) -> u32 {
    (3 * seo + 3 * readability + 4 * engagement + 5) / 10
}

fn seo_score(details: &ScoreDetails) -> u32 {
    let density = details.keyword_density;
    let mut score = if (1.0..=2.0).contains(&density) {
        40
    } else if density > 0.5 && density < 3.0 {
        25
    } else {
        10
    };

    if details.heading_structure {
        score += 30;
    }

    // Target: 1500-3000 words
    if (1500..=3000).contains(&details.content_length) {
        score += 30;
    } else if details.content_length >= 1000 {
        score += 20;
    }

    score.min(100)
}

fn readability_score(details: &ScoreDetails, has_list: bool) -> u32 {
    let avg = details.avg_sentence_length;
    // Target: 15-20 words per sentence
    let mut score = if (15.0..=20.0).contains(&avg) {
        40
    } else if (10.0..=25.0).contains(&avg) {
        25
    } else {
        10
    };

    if details.paragraph_count >= 8 {
        score += 30;
    } else if details.paragraph_count >= 5 {
        score += 20;
    }

    if has_list {
        score += 30;
    }

    score.min(100)
}

fn engagement_score(has_cta: bool, question_count: usize, has_emphasis: bool) -> u32 {
    let mut score = 0;

    if has_cta {
        score += 40;
    }

    if question_count >= 3 {
        score += 30;
    } else if question_count >= 1 {
        score += 15;
    }

    if has_emphasis {
        score += 30;
    }

    score.min(100)
}

/// Case-insensitive substring hits of every keyword, per 100 plain-text words.
///
/// Deliberately permissive: "moc" also matches inside "mocy". Blank keywords
/// are skipped. An empty text counts as one word, so the result is finite.
pub fn keyword_density(plain_text: &str, keywords: &[String]) -> f64 {
    let text = plain_text.to_lowercase();
    let total_words = text.split_whitespace().count().max(1);

    let keyword_count: usize = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| text.matches(k.as_str()).count())
        .sum();

    keyword_count as f64 / total_words as f64 * 100.0
}

fn has_heading_structure(content: &str) -> bool {
    content.contains("<h2>") || content.contains("<h3>")
}

fn avg_sentence_length(plain_text: &str) -> f64 {
    let sentence_count = sentences(plain_text).len();
    if sentence_count == 0 {
        return 0.0;
    }
    plain_text.split_whitespace().count() as f64 / sentence_count as f64
}

fn count_paragraphs(content: &str) -> usize {
    content.matches("<p>").count()
}

fn has_list(content: &str) -> bool {
    content.contains("<ul>") || content.contains("<ol>")
}

fn count_questions(content: &str) -> usize {
    content.matches('?').count()
}

fn has_emphasis(content: &str) -> bool {
    content.contains("<strong>") || content.contains("<em>")
}

fn has_call_to_action(plain_text: &str, locale: CtaLocale) -> bool {
    let text = plain_text.to_lowercase();
    locale.phrases().iter().any(|phrase| text.contains(phrase))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::text::raw_word_count;
    use crate::llm_client::Provider;
    use chrono::Utc;

    fn article(content: String) -> GeneratedArticle {
        GeneratedArticle {
            title: "X".to_string(),
            word_count: raw_word_count(&content),
            content,
            writer: Provider::Gemini,
            generated_at: Utc::now(),
        }
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    /// `n` filler words free of the letters x and y, in sentences of 16 words.
    fn filler(n: usize) -> String {
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let word = if (i + 1) % 16 == 0 { "lorem." } else { "lorem" };
            out.push(word);
        }
        out.join(" ")
    }

    #[test]
    fn test_keyword_density_exact_formula() {
        // 2 hits of "x" + 1 hit of "y" over 10 words = 30%
        let text = "x a b x c d e f g y";
        let density = keyword_density(text, &kw(&["x", "y"]));
        assert!((density - 30.0).abs() < 1e-9, "density was {density}");
    }

    #[test]
    fn test_keyword_density_counts_substrings_case_insensitively() {
        let text = "Moc bierna i kompensacja mocy";
        // "moc" hits "Moc" and the prefix of "mocy"
        let density = keyword_density(text, &kw(&["MOC"]));
        assert!((density - 40.0).abs() < 1e-9, "density was {density}");
    }

    #[test]
    fn test_keyword_density_empty_text_is_zero() {
        assert_eq!(keyword_density("", &kw(&["x"])), 0.0);
    }

    #[test]
    fn test_keyword_density_ignores_blank_keywords() {
        assert_eq!(keyword_density("a b c", &kw(&["", "  "])), 0.0);
    }

    #[test]
    fn test_total_score_weights_and_rounding() {
        assert_eq!(total_score(100, 100, 100), 100);
        assert_eq!(total_score(0, 0, 0), 0);
        // 30 + 27 + 22 = 79
        assert_eq!(total_score(100, 90, 55), 79);
        // 0.3*45 + 0.3*0 + 0.4*0 = 13.5 → 14
        assert_eq!(total_score(45, 0, 0), 14);
        // 0.4*15 + 0.3*5 = 7.5 → 8
        assert_eq!(total_score(5, 0, 15), 8);
    }

    #[test]
    fn test_total_score_always_within_bounds() {
        for seo in (0..=100).step_by(5) {
            for readability in (0..=100).step_by(5) {
                for engagement in (0..=100).step_by(5) {
                    let total = total_score(seo, readability, engagement);
                    assert!(total <= 100);
                    let exact = 0.3 * seo as f64 + 0.3 * readability as f64 + 0.4 * engagement as f64;
                    assert!((total as f64 - exact).abs() <= 0.5 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_seo_bands() {
        let mut details = ScoreDetails {
            keyword_density: 1.5,
            heading_structure: true,
            content_length: 2000,
            avg_sentence_length: 0.0,
            paragraph_count: 0,
            has_call_to_action: false,
        };
        assert_eq!(seo_score(&details), 100);

        details.keyword_density = 2.5;
        details.content_length = 1200;
        assert_eq!(seo_score(&details), 25 + 30 + 20);

        details.keyword_density = 0.5; // boundary is exclusive
        details.heading_structure = false;
        details.content_length = 999;
        assert_eq!(seo_score(&details), 10);

        details.keyword_density = 3.0;
        details.content_length = 3001;
        assert_eq!(seo_score(&details), 10 + 20);
    }

    #[test]
    fn test_readability_bands() {
        let mut details = ScoreDetails {
            keyword_density: 0.0,
            heading_structure: false,
            content_length: 0,
            avg_sentence_length: 17.0,
            paragraph_count: 8,
            has_call_to_action: false,
        };
        assert_eq!(readability_score(&details, true), 100);

        details.avg_sentence_length = 24.0;
        details.paragraph_count = 6;
        assert_eq!(readability_score(&details, true), 25 + 20 + 30);

        details.avg_sentence_length = 30.0;
        details.paragraph_count = 4;
        assert_eq!(readability_score(&details, false), 10);
    }

    #[test]
    fn test_engagement_bands() {
        assert_eq!(engagement_score(true, 3, true), 100);
        assert_eq!(engagement_score(true, 2, false), 55);
        assert_eq!(engagement_score(false, 1, true), 45);
        assert_eq!(engagement_score(false, 0, false), 0);
    }

    #[test]
    fn test_cta_lexicon_is_locale_specific() {
        assert!(has_call_to_action("Dowiedz się więcej o nas", CtaLocale::Pl));
        assert!(!has_call_to_action("Learn more about us", CtaLocale::Pl));
        assert!(has_call_to_action("Learn More about us", CtaLocale::En));
        assert_eq!(CtaLocale::from_code("EN"), CtaLocale::En);
        assert_eq!(CtaLocale::from_code("de"), CtaLocale::Pl);
    }

    #[test]
    fn test_markup_is_not_counted_as_words() {
        let plain = strip_html("<p>x</p><p>a</p>");
        // two plain words, one keyword hit
        assert!((keyword_density(&plain, &kw(&["x"])) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_article_evaluation() {
        // 10 paragraphs of 160 filler words (10 sentences of 16 words each),
        // one keyword pair per paragraph in its own short sentence.
        let mut content = String::from("<h2>Wprowadzenie</h2>\n");
        for i in 0..10 {
            content.push_str("<p>");
            content.push_str(&filler(160));
            if i < 2 {
                content.push_str(" Co dalej?");
            }
            content.push_str(" x y x.</p>\n");
        }
        content.push_str("<ul><li>lorem</li></ul>\n<p>Dowiedz się więcej.</p>");

        let scored = ArticleScorer::default().evaluate(&article(content), &kw(&["x", "y"]));

        assert!(scored.details.heading_structure);
        assert_eq!(scored.details.paragraph_count, 11);
        assert!(scored.details.has_call_to_action);
        assert!(scored.details.content_length >= 1500);
        assert!(
            (1.0..=2.0).contains(&scored.details.keyword_density),
            "density was {}",
            scored.details.keyword_density
        );
        assert_eq!(scored.seo_score, 100);
        assert_eq!(scored.engagement_score, 55);
        assert_eq!(
            scored.total_score,
            total_score(scored.seo_score, scored.readability_score, scored.engagement_score)
        );
    }
}
