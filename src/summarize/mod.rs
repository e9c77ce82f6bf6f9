//! Article summarization

pub mod llm;
pub mod lsa;

pub use llm::LlmSummarizer;
pub use lsa::LsaSummarizer;

use crate::config::{SummarizerBackend, SummarizerConfig};
use crate::error::Result;
use crate::metrics::METRICS;
use crate::text::truncate_chars;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Summarizer trait for different summarization strategies
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reduce `text` to at most `max_sentences` sentences
    async fn summarize(&self, text: &str, max_sentences: usize) -> Result<String>;
}

pub fn build_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    match config.backend {
        SummarizerBackend::Lsa => Ok(Arc::new(LsaSummarizer::new())),
        SummarizerBackend::Llm => Ok(Arc::new(LlmSummarizer::new(config)?)),
    }
}

/// How an article's summary was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMethod {
    Summarized,
    RawFallback,
}

impl SummaryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMethod::Summarized => "summarized",
            SummaryMethod::RawFallback => "raw_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub text: String,
    pub method: SummaryMethod,
}

/// Summarize an article, falling back to its truncated raw text
///
/// The fallback applies when the summarizer errors or returns nothing, so a
/// scraped article is never lost at this stage.
pub async fn summarize_or_truncate(
    summarizer: &dyn Summarizer,
    text: &str,
    max_sentences: usize,
    raw_fallback_chars: usize,
) -> Summary {
    let summary = match summarizer.summarize(text, max_sentences).await {
        Ok(summary) if !summary.trim().is_empty() => Summary {
            text: summary,
            method: SummaryMethod::Summarized,
        },
        Ok(_) => {
            debug!("{} summary empty, using raw text", summarizer.name());
            raw_summary(text, raw_fallback_chars)
        }
        Err(e) => {
            warn!("{} summarization error, using raw text: {}", summarizer.name(), e);
            raw_summary(text, raw_fallback_chars)
        }
    };

    METRICS.record_summary(summary.method.as_str());
    summary
}

fn raw_summary(text: &str, max_chars: usize) -> Summary {
    Summary {
        text: truncate_chars(text, max_chars).to_string(),
        method: SummaryMethod::RawFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TruthLensError;

    struct Failing;

    #[async_trait]
    impl Summarizer for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn summarize(&self, _text: &str, _max_sentences: usize) -> Result<String> {
            Err(TruthLensError::Summarization("boom".to_string()))
        }
    }

    struct Empty;

    #[async_trait]
    impl Summarizer for Empty {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn summarize(&self, _text: &str, _max_sentences: usize) -> Result<String> {
            Ok("   ".to_string())
        }
    }

    #[tokio::test]
    async fn test_error_falls_back_to_truncated_text() {
        let text = "x".repeat(6000);
        let summary = summarize_or_truncate(&Failing, &text, 10, 5000).await;
        assert_eq!(summary.method, SummaryMethod::RawFallback);
        assert_eq!(summary.text.chars().count(), 5000);
    }

    #[tokio::test]
    async fn test_empty_summary_falls_back() {
        let summary = summarize_or_truncate(&Empty, "Short text kept verbatim.", 10, 5000).await;
        assert_eq!(summary.method, SummaryMethod::RawFallback);
        assert_eq!(summary.text, "Short text kept verbatim.");
    }

    #[tokio::test]
    async fn test_lsa_summary_is_used() {
        let summary =
            summarize_or_truncate(&LsaSummarizer::new(), "First point. Second point.", 10, 5000).await;
        assert_eq!(summary.method, SummaryMethod::Summarized);
        assert_eq!(summary.text, "First point. Second point.");
    }

    #[test]
    fn test_build_summarizer_selects_backend() {
        let lsa = build_summarizer(&SummarizerConfig::default()).unwrap();
        assert_eq!(lsa.name(), "lsa");

        let llm = build_summarizer(&SummarizerConfig {
            backend: SummarizerBackend::Llm,
            ..SummarizerConfig::default()
        })
        .unwrap();
        assert_eq!(llm.name(), "llm");
    }
}
