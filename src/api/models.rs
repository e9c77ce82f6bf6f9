//! Request and response bodies

use crate::circuit_breaker::BreakerState;
use crate::pipeline::FactCheckReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `POST /` form body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimForm {
    #[serde(default)]
    pub facts: String,
}

/// `POST /verify` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub claim: String,
}

/// `POST /verify` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub verdict: String,
    pub confidence: String,
    /// Number of sources behind the verdict
    pub sources: usize,
    pub source_urls: Vec<String>,
}

impl From<&FactCheckReport> for VerifyResponse {
    fn from(report: &FactCheckReport) -> Self {
        Self {
            verdict: report.verdict_label.clone(),
            confidence: report.confidence.clone(),
            sources: report.source_urls.len(),
            source_urls: report.source_urls.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Breaker state per upstream operation
    pub circuits: BTreeMap<String, BreakerState>,
}
