//! Hugging Face inference API zero-shot classification

use super::{ContentClassifier, LabelScore};
use crate::config::ClassifierConfig;
use crate::error::{Result, TruthLensError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

pub struct ZeroShotClassifier {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl ZeroShotClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ContentClassifier for ZeroShotClassifier {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>> {
        let mut req = self.client.post(&self.endpoint).json(&ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
            },
        });
        if let Some(ref api_key) = self.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TruthLensError::Upstream {
                service: "classifier",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ZeroShotResponse = response.json().await.map_err(|e| {
            TruthLensError::Classification(format!("Failed to parse response: {}", e))
        })?;
        if parsed.labels.len() != parsed.scores.len() {
            return Err(TruthLensError::Classification(format!(
                "{} labels but {} scores",
                parsed.labels.len(),
                parsed.scores.len()
            )));
        }

        let mut ranked: Vec<LabelScore> = parsed
            .labels
            .into_iter()
            .zip(parsed.scores)
            .map(|(label, score)| LabelScore { label, score })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}
