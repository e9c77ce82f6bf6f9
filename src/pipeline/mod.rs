//! Fact checking service
//!
//! Runs search, scrape, summarize, similarity and verdict for a claim and
//! caches finished reports by claim.

pub mod report;

pub use report::{AnalyzedSource, FactCheckReport};

use crate::circuit_breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
use crate::classify::{build_classifier, ContentClassifier, Moderation, Moderator};
use crate::config::{Config, VerdictConfig};
use crate::error::{Result, TruthLensError};
use crate::metrics::METRICS;
use crate::scrape::{Article, ArticleScraper};
use crate::search::{build_provider, prepare_query, SearchOutcome, SearchProvider, WebSearcher};
use crate::similarity::{build_embedder, Embedder, SimilarityChecker};
use crate::summarize::{build_summarizer, summarize_or_truncate, Summarizer, Summary};
use crate::text::collapse_whitespace;
use crate::time_stage;
use crate::verdict::{self, SimilarityStats, Verdict};
use crate::visuals::{select_visual, WordCloud};
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Upstream operations guarded by the shared circuit breaker
const CIRCUITS: [&str; 3] = ["search", "embed", "classify"];

pub struct FactChecker {
    searcher: WebSearcher,
    scraper: ArticleScraper,
    summarizer: Arc<dyn Summarizer>,
    similarity_checker: SimilarityChecker,
    moderator: Moderator,
    word_cloud: WordCloud,
    thresholds: VerdictConfig,
    max_sentences: usize,
    raw_fallback_chars: usize,
    max_claim_chars: usize,
    breaker: Arc<CircuitBreaker>,
    cache: Option<Cache<String, Arc<FactCheckReport>>>,
}

impl FactChecker {
    /// Build every stage from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        FactCheckerBuilder::new(config.clone()).build()
    }

    pub fn builder(config: Config) -> FactCheckerBuilder {
        FactCheckerBuilder::new(config)
    }

    /// Verify a claim end to end
    #[instrument(skip(self, claim), fields(claim_len = claim.len()))]
    pub async fn check(&self, claim: &str) -> Result<FactCheckReport> {
        let claim = self.validate_claim(claim)?;
        let key = cache_key(&claim);

        if let Some(cache) = &self.cache {
            if let Some(report) = cache.get(&key).await {
                METRICS.record_cache(true);
                info!("Serving cached verdict: {}", report.verdict.as_str());
                let mut report = (*report).clone();
                report.cached = true;
                return Ok(report);
            }
            METRICS.record_cache(false);
        }

        let report = self.run(&claim).await;
        METRICS.record_verdict(report.verdict.as_str());

        // Only reports backed by scored sources are cached; the rest are
        // retried on the next request
        if let Some(cache) = &self.cache {
            if report.stats.count > 0 {
                cache.insert(key, Arc::new(report.clone())).await;
            } else {
                debug!("Not caching {} report", report.verdict.as_str());
            }
        }
        Ok(report)
    }

    /// Trimmed claim, or a validation error
    pub fn validate_claim(&self, claim: &str) -> Result<String> {
        let claim = collapse_whitespace(claim);
        if claim.is_empty() {
            return Err(TruthLensError::Validation("claim cannot be empty".to_string()));
        }
        let chars = claim.chars().count();
        if chars > self.max_claim_chars {
            return Err(TruthLensError::Validation(format!(
                "claim is {} characters, the limit is {}",
                chars, self.max_claim_chars
            )));
        }
        Ok(claim)
    }

    async fn run(&self, claim: &str) -> FactCheckReport {
        let started = Instant::now();
        let query = prepare_query(claim);

        let outcome = time_stage!("search", self.search(&query).await);
        let articles = time_stage!("scrape", self.scrape(&outcome.urls).await);
        let summaries = time_stage!("summarize", self.summarize(&articles).await);
        let texts = summary_texts(&summaries);
        let scores = time_stage!("similarity", self.similarity(claim, &texts).await);
        let mut report = time_stage!(
            "verdict",
            self.assess(claim, &outcome, &articles, &summaries, &scores).await
        );

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            verdict = report.verdict.as_str(),
            sources = report.source_urls.len(),
            elapsed_ms = report.elapsed_ms,
            "Fact check complete"
        );
        report
    }

    /// Build the report from the outputs of the earlier stages
    ///
    /// Without summaries the verdict is `InsufficientData` when search found
    /// nothing and `SourcesFoundUnanalyzed` when it found URLs that could
    /// not be read.
    pub async fn assess(
        &self,
        claim: &str,
        outcome: &SearchOutcome,
        articles: &[Article],
        summaries: &[Summary],
        scores: &[f32],
    ) -> FactCheckReport {
        let mut report = if summaries.is_empty() {
            self.unanalyzed_report(claim, outcome)
        } else {
            let mut report = self.decide(claim, scores, articles.len()).await;
            report.sources = articles
                .iter()
                .zip(summaries)
                .zip(scores)
                .map(|((article, summary), score)| AnalyzedSource {
                    url: article.url.clone(),
                    title: article.title.clone(),
                    similarity: *score,
                    summary_method: summary.method,
                })
                .collect();
            report.source_urls = articles.iter().map(|a| a.url.clone()).collect();
            report.visual = Some(select_visual(articles, &summary_texts(summaries), &self.word_cloud));
            report
        };

        report.search_strategy = outcome.winning_strategy();
        report
    }

    fn unanalyzed_report(&self, claim: &str, outcome: &SearchOutcome) -> FactCheckReport {
        if outcome.urls.is_empty() {
            return FactCheckReport::new(claim, Verdict::InsufficientData, SimilarityStats::default());
        }

        let mut report =
            FactCheckReport::new(claim, Verdict::SourcesFoundUnanalyzed, SimilarityStats::default());
        report.source_urls = outcome.urls.clone();
        report.visual = Some(select_visual(&[], &[], &self.word_cloud));
        report
    }

    /// Current breaker state of every guarded upstream
    pub fn circuit_states(&self) -> BTreeMap<String, BreakerState> {
        CIRCUITS
            .iter()
            .map(|op| (op.to_string(), self.breaker.state(op)))
            .collect()
    }

    /// Search stage
    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.searcher.search_web(query).await
    }

    /// Scrape stage
    pub async fn scrape(&self, urls: &[String]) -> Vec<Article> {
        self.scraper.scrape_all(urls).await
    }

    /// Summarize stage, one summary per article
    pub async fn summarize(&self, articles: &[Article]) -> Vec<Summary> {
        let mut summaries = Vec::with_capacity(articles.len());
        for article in articles {
            let summary = summarize_or_truncate(
                self.summarizer.as_ref(),
                &article.text,
                self.max_sentences,
                self.raw_fallback_chars,
            )
            .await;
            debug!("Summarized {} ({:?})", article.url, summary.method);
            summaries.push(summary);
        }
        summaries
    }

    /// Similarity stage
    pub async fn similarity(&self, claim: &str, summaries: &[String]) -> Vec<f32> {
        self.similarity_checker.check_similarity(claim, summaries).await
    }

    /// Verdict stage; moderation only runs when the scores lean true
    pub async fn decide(&self, claim: &str, scores: &[f32], source_count: usize) -> FactCheckReport {
        let stats = SimilarityStats::from_scores(scores);
        let leaning = verdict::lean(&stats, source_count, &self.thresholds);

        let moderation = if leaning.is_true() && self.moderator.is_enabled() {
            Some(self.moderator.moderate(claim).await)
        } else {
            None
        };

        let verdict = verdict::classify(
            &stats,
            source_count,
            moderation.unwrap_or(Moderation::Clean),
            &self.thresholds,
        );
        let mut report = FactCheckReport::new(claim, verdict, stats);
        report.moderation = moderation;
        report
    }
}

fn summary_texts(summaries: &[Summary]) -> Vec<String> {
    summaries.iter().map(|s| s.text.clone()).collect()
}

/// Cache key: SHA-256 of the lowercased, whitespace-collapsed claim
pub fn cache_key(claim: &str) -> String {
    hex::encode(Sha256::digest(collapse_whitespace(claim).to_lowercase().as_bytes()))
}

/// Builds a [`FactChecker`], letting callers swap any upstream backend
pub struct FactCheckerBuilder {
    config: Config,
    search_provider: Option<Arc<dyn SearchProvider>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    embedder: Option<Arc<dyn Embedder>>,
    classifier: Option<Arc<dyn ContentClassifier>>,
}

impl FactCheckerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            search_provider: None,
            summarizer: None,
            embedder: None,
            classifier: None,
        }
    }

    pub fn search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search_provider = Some(provider);
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn build(self) -> Result<FactChecker> {
        let config = self.config;
        config.validate()?;

        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::from(
            &config.circuit_breaker,
        )));

        let provider = match self.search_provider {
            Some(provider) => provider,
            None => build_provider(&config.search)?,
        };
        let summarizer = match self.summarizer {
            Some(summarizer) => summarizer,
            None => build_summarizer(&config.summarizer)?,
        };
        let embedder = match self.embedder {
            Some(embedder) => embedder,
            None => build_embedder(&config.embedding)?,
        };
        let classifier = match self.classifier {
            Some(classifier) => Some(classifier),
            None => build_classifier(&config.classifier)?,
        };

        let cache = config.cache.enabled.then(|| {
            Cache::builder()
                .max_capacity(config.cache.max_entries)
                .time_to_live(config.cache.ttl())
                .build()
        });

        info!(
            search = provider.name(),
            summarizer = summarizer.name(),
            embedder = embedder.name(),
            moderation = classifier.is_some(),
            "Fact checker ready"
        );

        Ok(FactChecker {
            searcher: WebSearcher::new(provider, breaker.clone(), &config.search),
            scraper: ArticleScraper::new(&config.scraper)?,
            summarizer,
            similarity_checker: SimilarityChecker::new(embedder, breaker.clone()),
            moderator: Moderator::new(classifier, breaker.clone()),
            word_cloud: WordCloud::new(&config.visuals),
            thresholds: config.verdict.clone(),
            max_sentences: config.summarizer.max_sentences,
            raw_fallback_chars: config.summarizer.raw_fallback_chars,
            max_claim_chars: config.server.max_claim_chars,
            breaker,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalizes() {
        assert_eq!(cache_key("  India   launches Chandrayaan "), cache_key("india launches chandrayaan"));
        assert_ne!(cache_key("india"), cache_key("china"));
        assert_eq!(cache_key("x").len(), 64);
    }

    #[test]
    fn test_validate_claim() {
        let mut config = Config::default();
        config.server.max_claim_chars = 11;
        let checker = FactChecker::from_config(&config).unwrap();

        assert_eq!(checker.validate_claim("  short \n claim ").unwrap(), "short claim");
        assert!(matches!(checker.validate_claim("   "), Err(TruthLensError::Validation(_))));
        assert!(matches!(
            checker.validate_claim("this claim is far too long"),
            Err(TruthLensError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_claim_length_boundary() {
        let mut config = Config::default();
        config.server.max_claim_chars = 5;
        let checker = FactChecker::from_config(&config).unwrap();

        // Counted in chars, after collapsing whitespace
        assert_eq!(checker.validate_claim(" éclat ").unwrap(), "éclat");
        assert_eq!(checker.validate_claim("a  b c").unwrap(), "a b c");
        assert!(matches!(checker.validate_claim("éclat!"), Err(TruthLensError::Validation(_))));
    }

    #[tokio::test]
    async fn test_decide_without_moderation() {
        let checker = FactChecker::from_config(&Config::default()).unwrap();
        let report = checker.decide("claim", &[0.5, 0.6], 2).await;
        assert_eq!(report.verdict, Verdict::TrueHighConfidence);
        assert_eq!(report.confidence, "60%");
        assert!(report.moderation.is_none());
    }
}
