// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction shared by every prompt whose output is published as HTML.
pub const HTML_ONLY_INSTRUCTION: &str = "\
    Return ONLY the clean HTML of the article: no markdown, no code fences, \
    no <html>, <head> or <body> wrappers. Use semantic tags only: \
    <h2>, <h3>, <p>, <ul>, <ol>, <li>, <strong>, <em>.";
