//! Fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use truthlens::classify::{ContentClassifier, LabelScore};
use truthlens::search::{SearchHit, SearchProvider};
use truthlens::similarity::Embedder;
use truthlens::{Config, FactChecker, Result, TruthLensError};

/// Search provider that always returns the same URLs and counts calls
pub struct StaticSearch {
    urls: Vec<String>,
    calls: AtomicUsize,
}

impl StaticSearch {
    pub fn new(urls: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            urls,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .urls
            .iter()
            .take(max_results)
            .map(|url| SearchHit {
                url: url.clone(),
                title: String::new(),
                snippet: String::new(),
            })
            .collect())
    }
}

/// Search provider that errors until it is switched on
pub struct OutageSearch {
    urls: Vec<String>,
    up: AtomicBool,
    calls: AtomicUsize,
}

impl OutageSearch {
    pub fn new(urls: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            urls,
            up: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn recover(&self) {
        self.up.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for OutageSearch {
    fn name(&self) -> &'static str {
        "outage"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.up.load(Ordering::SeqCst) {
            return Err(TruthLensError::Upstream {
                service: "outage",
                status: 429,
                body: "rate limited".to_string(),
            });
        }
        Ok(self
            .urls
            .iter()
            .map(|url| SearchHit {
                url: url.clone(),
                title: String::new(),
                snippet: String::new(),
            })
            .collect())
    }
}

/// Embeds any text mentioning `topic` on one axis and everything else on the other
pub struct TopicEmbedder {
    pub topic: &'static str,
}

#[async_trait]
impl Embedder for TopicEmbedder {
    fn name(&self) -> &'static str {
        "topic"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.to_lowercase().contains(self.topic) {
            Ok(vec![1.0, 0.0])
        } else {
            Ok(vec![0.0, 1.0])
        }
    }
}

/// Classifier that ranks `flagged` first for every label set containing it
pub struct FlaggingClassifier {
    pub flagged: &'static str,
}

#[async_trait]
impl ContentClassifier for FlaggingClassifier {
    async fn classify(&self, _text: &str, labels: &[&str]) -> Result<Vec<LabelScore>> {
        let mut ranked: Vec<LabelScore> = labels
            .iter()
            .map(|label| LabelScore {
                label: label.to_string(),
                score: if *label == self.flagged { 0.9 } else { 0.1 },
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.scraper.timeout_ms = 2000;
    config.scraper.max_concurrency = 2;
    config
}

pub fn article_html(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        "<html><head><title>{}</title></head><body><article>{}</article></body></html>",
        title, body
    )
}

/// Paragraphs about the bridge vote, long enough to pass the scraper filters
pub const BRIDGE_STORY: [&str; 3] = [
    "The city council approved funding for the new river bridge on Tuesday evening.",
    "Council members said the bridge would cut commuting times across the river by half.",
    "Construction of the bridge is expected to begin next spring after a final design review.",
];

/// Paragraphs that never mention the bridge
pub const FESTIVAL_STORY: [&str; 3] = [
    "The annual food festival drew thousands of visitors to the old market square.",
    "Local vendors sold regional dishes while musicians played late into the evening.",
    "Organisers said attendance was the highest recorded since the festival began.",
];

pub fn checker_with(config: Config, search: Arc<StaticSearch>) -> FactChecker {
    FactChecker::builder(config)
        .search_provider(search)
        .embedder(Arc::new(TopicEmbedder { topic: "bridge" }))
        .build()
        .expect("fact checker builds")
}
