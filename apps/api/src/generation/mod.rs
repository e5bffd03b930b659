// Article generation engine.
// Implements: outline parsing, parallel multi-provider writing, scoring, selection.
// All LLM calls go through llm_client; nothing here talks to a vendor directly.

pub mod handlers;
pub mod outline;
pub mod parallel;
pub mod prompts;
pub mod scoring;
pub mod selector;
pub mod text;
pub mod writers;
