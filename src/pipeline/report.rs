//! Fact check results

use crate::classify::Moderation;
use crate::search::QueryStrategy;
use crate::summarize::SummaryMethod;
use crate::verdict::{SimilarityStats, Verdict};
use crate::visuals::Visual;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One scraped and summarized source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedSource {
    pub url: String,
    pub title: Option<String>,
    pub similarity: f32,
    pub summary_method: SummaryMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactCheckReport {
    pub id: Uuid,
    pub claim: String,
    pub verdict: Verdict,
    pub verdict_label: String,
    /// Max similarity as a percentage, `"0%"` when nothing was compared
    pub confidence: String,
    pub stats: SimilarityStats,
    pub sources: Vec<AnalyzedSource>,
    /// Analyzed source URLs, or the discovered URLs when none could be analyzed
    pub source_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_strategy: Option<QueryStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<Moderation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<Visual>,
    pub checked_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub cached: bool,
}

impl FactCheckReport {
    pub(crate) fn new(claim: &str, verdict: Verdict, stats: SimilarityStats) -> Self {
        Self {
            id: Uuid::new_v4(),
            claim: claim.to_string(),
            verdict,
            verdict_label: verdict.label().to_string(),
            confidence: stats.confidence(),
            stats,
            sources: Vec::new(),
            source_urls: Vec::new(),
            search_strategy: None,
            moderation: None,
            visual: None,
            checked_at: Utc::now(),
            elapsed_ms: 0,
            cached: false,
        }
    }

    pub fn scores(&self) -> Vec<f32> {
        self.sources.iter().map(|s| s.similarity).collect()
    }
}
