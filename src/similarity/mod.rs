//! Claim-to-summary semantic similarity

pub mod hashed;
pub mod http;

pub use hashed::HashedBagOfWords;
pub use http::HttpEmbedder;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::{Result, TruthLensError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

const BREAKER_OP: &str = "embed";

/// Text to vector backend
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.backend {
        EmbeddingBackend::Hashed => Ok(Arc::new(HashedBagOfWords::new(config.dimensions))),
        EmbeddingBackend::Http => Ok(Arc::new(HttpEmbedder::new(config)?)),
    }
}

/// Cosine similarity, `0.0` for mismatched lengths or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Scores summaries against a claim through an embedder
pub struct SimilarityChecker {
    embedder: Arc<dyn Embedder>,
    breaker: Arc<CircuitBreaker>,
}

impl SimilarityChecker {
    pub fn new(embedder: Arc<dyn Embedder>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { embedder, breaker }
    }

    /// One score per summary, in order
    ///
    /// A summary that cannot be embedded scores `0.0`; if the claim itself
    /// cannot be embedded every summary does.
    pub async fn check_similarity(&self, claim: &str, summaries: &[String]) -> Vec<f32> {
        if summaries.is_empty() {
            return Vec::new();
        }

        let claim_vector = match self.embed(claim).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to embed claim: {}", e);
                return vec![0.0; summaries.len()];
            }
        };

        let mut scores = Vec::with_capacity(summaries.len());
        for (i, summary) in summaries.iter().enumerate() {
            let score = match self.embed(summary).await {
                Ok(v) => cosine_similarity(&claim_vector, &v).clamp(0.0, 1.0),
                Err(e) => {
                    warn!("Failed to embed summary {}: {}", i, e);
                    0.0
                }
            };
            debug!("Summary {} similarity: {:.3}", i, score);
            scores.push(score);
        }
        scores
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.breaker.is_open(BREAKER_OP) {
            return Err(TruthLensError::CircuitOpen(BREAKER_OP.to_string()));
        }
        match self.embedder.embed(text).await {
            Ok(v) => {
                self.breaker.mark_success(BREAKER_OP);
                Ok(v)
            }
            Err(e) => {
                self.breaker.mark_failure(BREAKER_OP);
                METRICS.record_upstream_error(BREAKER_OP);
                Err(e)
            }
        }
    }
}
