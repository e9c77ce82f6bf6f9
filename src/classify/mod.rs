//! Claim moderation through zero-shot classification

pub mod zero_shot;

pub use zero_shot::ZeroShotClassifier;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::ClassifierConfig;
use crate::error::{Result, TruthLensError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const BREAKER_OP: &str = "classify";

pub const HATE_SPEECH_LABELS: [&str; 2] = ["hate speech", "non-hate speech"];
pub const PROFANITY_LABELS: [&str; 2] = ["Not Profane", "Profane"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Zero-shot text classifier
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Score `text` against `labels`, best first
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>>;
}

/// Moderation result for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Moderation {
    Clean,
    HateSpeech,
    Profanity,
}

/// `None` when classification is disabled
pub fn build_classifier(config: &ClassifierConfig) -> Result<Option<Arc<dyn ContentClassifier>>> {
    if !config.enabled {
        return Ok(None);
    }
    Ok(Some(Arc::new(ZeroShotClassifier::new(config)?)))
}

/// Runs the hate speech check, then the profanity check
pub struct Moderator {
    classifier: Option<Arc<dyn ContentClassifier>>,
    breaker: Arc<CircuitBreaker>,
}

impl Moderator {
    pub fn new(classifier: Option<Arc<dyn ContentClassifier>>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            classifier,
            breaker,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.classifier.is_some()
    }

    /// A failed check is logged and counts as not flagged
    pub async fn moderate(&self, claim: &str) -> Moderation {
        let Some(classifier) = self.classifier.as_deref() else {
            return Moderation::Clean;
        };

        if self.top_label_is(classifier, claim, &HATE_SPEECH_LABELS, "hate speech").await {
            return Moderation::HateSpeech;
        }
        if self.top_label_is(classifier, claim, &PROFANITY_LABELS, "Profane").await {
            return Moderation::Profanity;
        }
        Moderation::Clean
    }

    async fn top_label_is(
        &self,
        classifier: &dyn ContentClassifier,
        claim: &str,
        labels: &[&str],
        flagged: &str,
    ) -> bool {
        match self.classify(classifier, claim, labels).await {
            Ok(ranked) => {
                debug!("Moderation {:?}: {:?}", labels, ranked.first());
                ranked.first().map_or(false, |top| top.label == flagged)
            }
            Err(e) => {
                warn!("Classifier error for {:?}: {}", labels, e);
                false
            }
        }
    }

    async fn classify(
        &self,
        classifier: &dyn ContentClassifier,
        claim: &str,
        labels: &[&str],
    ) -> Result<Vec<LabelScore>> {
        if self.breaker.is_open(BREAKER_OP) {
            return Err(TruthLensError::CircuitOpen(BREAKER_OP.to_string()));
        }
        match classifier.classify(claim, labels).await {
            Ok(ranked) => {
                self.breaker.mark_success(BREAKER_OP);
                Ok(ranked)
            }
            Err(e) => {
                self.breaker.mark_failure(BREAKER_OP);
                METRICS.record_upstream_error(BREAKER_OP);
                Err(e)
            }
        }
    }
}
