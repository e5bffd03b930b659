//! Parallel Generator: fans one outline out to every configured writer.
//!
//! All calls are dispatched together and the generator waits for every one
//! of them to settle. A failure or a timeout only removes that provider
//! from this cycle; siblings are never cancelled. Results come back in
//! provider-priority order regardless of which call finished first.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::outline::ArticleOutline;
use crate::generation::writers::{ArticleWriter, GeneratedArticle};
use crate::llm_client::{LlmError, ProviderCredentials};

/// Runs every configured writer concurrently and returns the successful articles.
///
/// Errors:
/// - `Configuration` when no provider has a credential (nothing is dispatched)
/// - `AllProvidersFailed` when every dispatched call failed, after all settled
pub async fn generate_all(
    writer: &dyn ArticleWriter,
    outline: &ArticleOutline,
    credentials: &ProviderCredentials,
    per_call_timeout: Duration,
) -> Result<Vec<GeneratedArticle>, AppError> {
    let configured = credentials.configured();
    if configured.is_empty() {
        return Err(AppError::Configuration(
            "No AI API keys configured".to_string(),
        ));
    }

    info!(
        topic = %outline.topic,
        providers = configured.len(),
        "Starting parallel generation"
    );
    let started = Instant::now();

    let calls = configured.into_iter().map(|(provider, api_key)| async move {
        let call_started = Instant::now();
        let outcome = match tokio::time::timeout(
            per_call_timeout,
            writer.write(provider, outline, api_key),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                secs: per_call_timeout.as_secs(),
            }),
        };
        (provider, outcome, call_started.elapsed())
    });

    // join_all keeps input order, so the output is already in priority order.
    let settled = join_all(calls).await;
    let attempted = settled.len();

    let mut articles = Vec::with_capacity(attempted);
    for (provider, outcome, elapsed) in settled {
        match outcome {
            Ok(reply) => {
                let article = GeneratedArticle::new(outline, provider, reply.text);
                info!(
                    %provider,
                    words = article.word_count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "AI writer completed"
                );
                articles.push(article);
            }
            Err(e) => {
                warn!(
                    %provider,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "AI writer failed: {e}"
                );
            }
        }
    }

    if articles.is_empty() {
        error!(attempted, "All AI writers failed for topic '{}'", outline.topic);
        return Err(AppError::AllProvidersFailed { attempted });
    }

    info!(
        "Completed {}/{} articles in {}ms",
        articles.len(),
        attempted,
        started.elapsed().as_millis()
    );

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::generation::outline::Category;
    use crate::llm_client::{LlmReply, Provider};

    /// Scripted writer: per provider, a delay and either content or a failure.
    struct FakeWriter {
        script: HashMap<Provider, (Duration, Option<&'static str>)>,
        calls: AtomicUsize,
        settled: Mutex<Vec<Provider>>,
    }

    impl FakeWriter {
        fn new(script: &[(Provider, u64, Option<&'static str>)]) -> Self {
            Self {
                script: script
                    .iter()
                    .map(|(p, ms, body)| (*p, (Duration::from_millis(*ms), *body)))
                    .collect(),
                calls: AtomicUsize::new(0),
                settled: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ArticleWriter for FakeWriter {
        async fn write(
            &self,
            provider: Provider,
            _outline: &ArticleOutline,
            _api_key: &str,
        ) -> Result<LlmReply, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, body) = self.script[&provider];
            tokio::time::sleep(delay).await;
            self.settled.lock().unwrap().push(provider);
            match body {
                Some(text) => Ok(LlmReply {
                    text: text.to_string(),
                    input_tokens: None,
                    output_tokens: None,
                }),
                None => Err(LlmError::Api {
                    status: 500,
                    message: format!("{provider} is down"),
                }),
            }
        }
    }

    fn outline() -> ArticleOutline {
        ArticleOutline {
            topic: "X".to_string(),
            keywords: vec!["x".to_string(), "y".to_string()],
            target_length: 1500,
            sections: vec!["A".to_string(), "B".to_string()],
            category: Category::default(),
        }
    }

    fn all_credentials() -> ProviderCredentials {
        ProviderCredentials::default()
            .with(Provider::Gemini, "g")
            .with(Provider::OpenAi, "o")
            .with(Provider::Anthropic, "a")
    }

    const TIMEOUT: Duration = Duration::from_secs(55);

    #[tokio::test]
    async fn test_no_credentials_fails_before_any_call() {
        let writer = FakeWriter::new(&[(Provider::Gemini, 0, Some("<p>a</p>"))]);
        let result =
            generate_all(&writer, &outline(), &ProviderCredentials::default(), TIMEOUT).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_credentials_count_as_missing() {
        let writer = FakeWriter::new(&[(Provider::Gemini, 0, Some("<p>a</p>"))]);
        let creds = ProviderCredentials::default().with(Provider::Gemini, "   ");
        let result = generate_all(&writer, &outline(), &creds, TIMEOUT).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_success_among_three_is_returned() {
        let writer = FakeWriter::new(&[
            (Provider::Gemini, 10, None),
            (Provider::OpenAi, 20, Some("<p>only me</p>")),
            (Provider::Anthropic, 30, None),
        ]);
        let articles = generate_all(&writer, &outline(), &all_credentials(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].writer, Provider::OpenAi);
        assert_eq!(articles[0].content, "<p>only me</p>");
        assert_eq!(articles[0].title, "X");
        assert_eq!(writer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failing_errors_only_after_every_call_settled() {
        let writer = FakeWriter::new(&[
            (Provider::Gemini, 10, None),
            (Provider::OpenAi, 500, None),
            (Provider::Anthropic, 2_000, None),
        ]);
        let started = tokio::time::Instant::now();
        let result = generate_all(&writer, &outline(), &all_credentials(), TIMEOUT).await;

        assert!(matches!(
            result,
            Err(AppError::AllProvidersFailed { attempted: 3 })
        ));
        assert!(started.elapsed() >= Duration::from_millis(2_000));
        assert_eq!(
            *writer.settled.lock().unwrap(),
            vec![Provider::Gemini, Provider::OpenAi, Provider::Anthropic]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_priority_not_completion_order() {
        let writer = FakeWriter::new(&[
            (Provider::Gemini, 300, Some("<p>gemini</p>")),
            (Provider::OpenAi, 200, Some("<p>chatgpt</p>")),
            (Provider::Anthropic, 100, Some("<p>claude</p>")),
        ]);
        let articles = generate_all(&writer, &outline(), &all_credentials(), TIMEOUT)
            .await
            .unwrap();

        let writers: Vec<_> = articles.iter().map(|a| a.writer).collect();
        assert_eq!(
            writers,
            vec![Provider::Gemini, Provider::OpenAi, Provider::Anthropic]
        );
        // Completion order was the reverse.
        assert_eq!(
            *writer.settled.lock().unwrap(),
            vec![Provider::Anthropic, Provider::OpenAi, Provider::Gemini]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_run_concurrently() {
        let writer = FakeWriter::new(&[
            (Provider::Gemini, 1_000, Some("<p>a</p>")),
            (Provider::OpenAi, 1_000, Some("<p>b</p>")),
            (Provider::Anthropic, 1_000, Some("<p>c</p>")),
        ]);
        let started = tokio::time::Instant::now();
        generate_all(&writer, &outline(), &all_credentials(), TIMEOUT)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_provider_failure() {
        let writer = FakeWriter::new(&[
            (Provider::Gemini, 120_000, Some("<p>too late</p>")),
            (Provider::OpenAi, 50, Some("<p>on time</p>")),
        ]);
        let creds = ProviderCredentials::default()
            .with(Provider::Gemini, "g")
            .with(Provider::OpenAi, "o");
        let articles = generate_all(&writer, &outline(), &creds, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].writer, Provider::OpenAi);
    }

    #[tokio::test]
    async fn test_only_configured_providers_are_called() {
        let writer = FakeWriter::new(&[
            (Provider::Gemini, 0, Some("<p>a</p>")),
            (Provider::Anthropic, 0, Some("<p>c</p>")),
        ]);
        let creds = ProviderCredentials::default()
            .with(Provider::Anthropic, "a")
            .with(Provider::Gemini, "g");
        let articles = generate_all(&writer, &outline(), &creds, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(writer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(articles[0].writer, Provider::Gemini);
        assert_eq!(articles[1].writer, Provider::Anthropic);
    }
}
