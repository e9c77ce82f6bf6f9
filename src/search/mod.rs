//! Web search with an ordered query fallback chain
//!
//! Each strategy is tried only while no URL has been found. Strategy
//! failures are logged and counted, never propagated: an exhausted chain
//! yields an empty URL list.

pub mod duckduckgo;
pub mod query;
pub mod tavily;

pub use duckduckgo::DuckDuckGoSearch;
pub use query::{extract_entities, prepare_query, simplify_query, QueryStrategy};
pub use tavily::TavilySearch;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{SearchBackend, SearchConfig};
use crate::error::{Result, TruthLensError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const BREAKER_OP: &str = "search";

/// One search engine result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// Search engine backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Build the configured search backend
pub fn build_provider(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    match config.provider {
        SearchBackend::DuckDuckGo => Ok(Arc::new(DuckDuckGoSearch::new(config)?)),
        SearchBackend::Tavily => {
            let api_key = config.tavily_api_key.clone().ok_or_else(|| {
                TruthLensError::Configuration(
                    "search.tavily_api_key is required for the tavily provider".to_string(),
                )
            })?;
            Ok(Arc::new(TavilySearch::new(config, api_key)?))
        }
    }
}

/// Outcome of a single strategy in the chain
#[derive(Debug, Clone, Serialize)]
pub struct SearchAttempt {
    pub strategy: QueryStrategy,
    pub query: String,
    pub hits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of the whole fallback chain
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    /// Deduplicated result URLs
    pub urls: Vec<String>,
    pub attempts: Vec<SearchAttempt>,
}

impl SearchOutcome {
    /// Strategy that produced the URLs, if any did
    pub fn winning_strategy(&self) -> Option<QueryStrategy> {
        self.attempts.iter().find(|a| a.hits > 0).map(|a| a.strategy)
    }
}

/// Runs the query strategies against a provider
pub struct WebSearcher {
    provider: Arc<dyn SearchProvider>,
    breaker: Arc<CircuitBreaker>,
    strategies: Vec<QueryStrategy>,
    keyword_suffix: String,
    num_results: usize,
}

impl WebSearcher {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        breaker: Arc<CircuitBreaker>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            provider,
            breaker,
            strategies: config.strategies.clone(),
            keyword_suffix: config.keyword_suffix.clone(),
            num_results: config.num_results,
        }
    }

    /// Search for `query`, falling back through the configured strategies
    pub async fn search_web(&self, query: &str) -> SearchOutcome {
        info!("Starting search for '{}' via {}", query, self.provider.name());

        let mut outcome = SearchOutcome::default();
        let mut tried: HashSet<String> = HashSet::new();
        let mut urls: IndexSet<String> = IndexSet::new();

        for strategy in &self.strategies {
            let Some(candidate) = strategy.build(query, &self.keyword_suffix) else {
                debug!("Strategy {} produced no query, skipping", strategy);
                continue;
            };
            // Repeated text queries are resent as a retry; entities only add value when new
            let repeated = !tried.insert(candidate.clone());
            if repeated && *strategy == QueryStrategy::Entities {
                debug!("Strategy {} repeats an earlier query, skipping", strategy);
                continue;
            }

            if self.breaker.is_open(BREAKER_OP) {
                warn!("Search circuit is open, abandoning fallback chain");
                METRICS.record_search_attempt(strategy.as_str(), "circuit_open");
                break;
            }

            debug!("Attempt {} query: {}", strategy, candidate);
            match self.provider.search(&candidate, self.num_results).await {
                Ok(hits) => {
                    self.breaker.mark_success(BREAKER_OP);
                    let before = urls.len();
                    urls.extend(hits.into_iter().filter_map(|hit| normalize_result_url(&hit.url)));
                    let found = urls.len() - before;

                    METRICS.record_search_attempt(
                        strategy.as_str(),
                        if found > 0 { "found" } else { "empty" },
                    );
                    outcome.attempts.push(SearchAttempt {
                        strategy: *strategy,
                        query: candidate,
                        hits: found,
                        error: None,
                    });
                    if found > 0 {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Search attempt {} failed: {}", strategy, e);
                    self.breaker.mark_failure(BREAKER_OP);
                    METRICS.record_upstream_error(BREAKER_OP);
                    METRICS.record_search_attempt(strategy.as_str(), "error");
                    outcome.attempts.push(SearchAttempt {
                        strategy: *strategy,
                        query: candidate,
                        hits: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcome.urls = urls.into_iter().collect();
        info!("Total URLs found: {}", outcome.urls.len());
        outcome
    }
}

/// Keep only absolute http(s) URLs, trimmed
fn normalize_result_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed.to_string()),
        _ => None,
    }
}
