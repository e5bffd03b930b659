// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::generation::outline::ArticleOutline;
use crate::llm_client::prompts::HTML_ONLY_INSTRUCTION;

/// System prompt shared by every article writer.
pub const ARTICLE_SYSTEM: &str = "You are an expert SEO content writer specialising in the \
    energy sector and reactive power compensation. You always write in Polish.";

/// House writing guide, prepended to every article prompt.
pub const WRITING_INSTRUCTIONS: &str = r#"STYLE
- Write in Polish, in a professional yet approachable tone.
- Length must stay within ±10% of the target length.

STRUCTURE
1. Introduction: a hook and a preview of what the reader will learn.
2. Main sections as <h2>, with <h3> subsections where useful.
3. FAQ with 5-7 questions and answers.
4. Summary ending with a call to action (e.g. "Skontaktuj się z nami", "Dowiedz się więcej").

SEO
- Main keyword in the first paragraph and in at least one heading.
- Keyword density between 1% and 2%.
- The first two sentences must work as a meta description (max 160 characters).
- Short paragraphs, bullet lists where they help scanning, <strong> for key facts.

GEO (answer-engine optimisation)
- Answer the reader's likely questions directly and early.
- Prefer concrete numbers, definitions and step-by-step guidance that an AI assistant can cite."#;

/// Article prompt template. Placeholders are replaced by `build_article_prompt`.
pub const ARTICLE_PROMPT_TEMPLATE: &str = r#"{writing_instructions}

---

YOUR TASK

Write a comprehensive blog post based on:

Topic: {topic}
Keywords: {keywords}
Target length: {target_length} words
Required sections: {sections}
Category: {category}

{html_only}

BEGIN WRITING THE ARTICLE NOW:"#;

pub fn build_article_prompt(outline: &ArticleOutline) -> String {
    let sections = if outline.sections.is_empty() {
        "(choose the most useful sections yourself)".to_string()
    } else {
        outline.sections.join(", ")
    };

    ARTICLE_PROMPT_TEMPLATE
        .replace("{writing_instructions}", WRITING_INSTRUCTIONS)
        .replace("{html_only}", HTML_ONLY_INSTRUCTION)
        .replace("{topic}", &outline.topic)
        .replace("{keywords}", &outline.keywords.join(", "))
        .replace("{target_length}", &outline.target_length.to_string())
        .replace("{sections}", &sections)
        .replace("{category}", outline.category.label())
}
