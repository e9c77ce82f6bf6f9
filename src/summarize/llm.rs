//! Abstractive summaries from an OpenAI-compatible chat completion endpoint

use super::Summarizer;
use crate::config::SummarizerConfig;
use crate::error::{Result, TruthLensError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Article text sent to the model is capped at this many characters
const MAX_INPUT_CHARS: usize = 12_000;

pub struct LlmSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    max_retries: usize,
}

impl LlmSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            endpoint: config.llm_endpoint.clone(),
            model: config.llm_model.clone(),
            api_key: config.llm_api_key.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    fn build_prompt(text: &str, max_sentences: usize) -> String {
        format!(
            "Summarize the following news article in at most {} sentences. \
            Keep names, dates, numbers and the central claims. \
            Do not add information that is not in the article.\n\n{}",
            max_sentences,
            crate::text::truncate_chars(text, MAX_INPUT_CHARS)
        )
    }

    async fn request_once(&self, request: &ChatCompletionRequest) -> Result<String> {
        let mut req = self.client.post(&self.endpoint).json(request);
        if let Some(ref api_key) = self.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TruthLensError::Upstream {
                service: "summarizer",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TruthLensError::Summarization(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| TruthLensError::Summarization("No choices in response".to_string()))
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn summarize(&self, text: &str, max_sentences: usize) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You summarize news articles faithfully and concisely.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(text, max_sentences),
                },
            ],
            temperature: Some(0.2),
        };

        let mut last_error = None;
        for attempt in 0..self.max_retries {
            if attempt > 0 {
                debug!("Retry attempt {} for summarization", attempt);
                tokio::time::sleep(Duration::from_millis(100 * (1 << attempt))).await;
            }

            match self.request_once(&request).await {
                Ok(summary) => return Ok(summary),
                Err(e) => last_error = Some(e),
            }
        }

        warn!("Summarization failed after {} attempts", self.max_retries);
        Err(last_error
            .unwrap_or_else(|| TruthLensError::Summarization("no attempts made".to_string())))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
