//! Article scraping
//!
//! Pages are fetched with browser-like headers and reduced to their
//! readable text. Only pages answering `200 OK` with enough text become
//! articles.

pub mod extract;

pub use extract::{extract_page, ExtractedPage};

use crate::config::ScraperConfig;
use crate::error::{Result, TruthLensError};
use crate::metrics::METRICS;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A scraped page with enough readable text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub image_url: Option<String>,
}

/// Result of scraping a single URL
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Usable(Article),
    /// Any status other than 200
    Skipped(u16),
    /// Extracted text at or below the article minimum
    TooShort(usize),
}

impl ScrapeOutcome {
    fn label(&self) -> &'static str {
        match self {
            ScrapeOutcome::Usable(_) => "usable",
            ScrapeOutcome::Skipped(_) => "skipped",
            ScrapeOutcome::TooShort(_) => "too_short",
        }
    }
}

pub struct ArticleScraper {
    client: reqwest::Client,
    min_block_chars: usize,
    min_article_chars: usize,
    max_concurrency: usize,
}

impl ArticleScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            min_block_chars: config.min_block_chars,
            min_article_chars: config.min_article_chars,
            max_concurrency: config.max_concurrency.max(1),
        })
    }

    /// Fetch one URL and extract its article text
    pub async fn scrape(&self, url: &str) -> Result<ScrapeOutcome> {
        let response = self.client.get(url).send().await.map_err(|e| TruthLensError::Scrape {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Skipping {} (status {})", url, status.as_u16());
            return Ok(ScrapeOutcome::Skipped(status.as_u16()));
        }

        let html = response.text().await.map_err(|e| TruthLensError::Scrape {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let page = extract_page(&html, url, self.min_block_chars)?;
        let chars = page.text.chars().count();
        if chars <= self.min_article_chars {
            debug!("Skipping {} ({} chars of text)", url, chars);
            return Ok(ScrapeOutcome::TooShort(chars));
        }

        Ok(ScrapeOutcome::Usable(Article {
            url: url.to_string(),
            title: page.title,
            text: page.text,
            image_url: page.image_url,
        }))
    }

    /// Scrape every URL, keeping only usable articles in input order
    pub async fn scrape_all(&self, urls: &[String]) -> Vec<Article> {
        let outcomes: Vec<(String, Result<ScrapeOutcome>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let outcome = self.scrape(&url).await;
                (url, outcome)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut articles = Vec::new();
        for (url, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    METRICS.record_scrape(outcome.label());
                    if let ScrapeOutcome::Usable(article) = outcome {
                        articles.push(article);
                    }
                }
                Err(e) => {
                    warn!("Failed to scrape {}: {}", url, e);
                    METRICS.record_scrape("error");
                }
            }
        }

        info!("Scraped {} usable articles from {} URLs", articles.len(), urls.len());
        articles
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| TruthLensError::Configuration(format!("invalid header value {:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html><head><title>Lunar landing</title></head><body>
          <p>The Vikram lander touched down near the lunar south pole on Wednesday evening.</p>
          <p>Scientists at the mission control centre in Bengaluru cheered as telemetry confirmed it.</p>
        </body></html>
    "#;

    fn scraper() -> ArticleScraper {
        ArticleScraper::new(&ScraperConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_scrape_usable_article() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/story")
            .match_header("accept-language", "en-US,en;q=0.5")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(ARTICLE)
            .create_async()
            .await;

        let url = format!("{}/story", server.url());
        let outcome = scraper().scrape(&url).await.unwrap();
        mock.assert_async().await;

        match outcome {
            ScrapeOutcome::Usable(article) => {
                assert_eq!(article.url, url);
                assert_eq!(article.title.as_deref(), Some("Lunar landing"));
                assert!(article.text.starts_with("The Vikram lander"));
            }
            other => panic!("expected usable article, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_200_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/gone").with_status(404).create_async().await;

        let outcome = scraper().scrape(&format!("{}/gone", server.url())).await.unwrap();
        assert_eq!(outcome, ScrapeOutcome::Skipped(404));
    }

    #[tokio::test]
    async fn test_short_page_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stub")
            .with_status(200)
            .with_body("<p>Subscribe to read the rest of this story today.</p>")
            .create_async()
            .await;

        let outcome = scraper().scrape(&format!("{}/stub", server.url())).await.unwrap();
        assert!(matches!(outcome, ScrapeOutcome::TooShort(_)));
    }

    #[tokio::test]
    async fn test_scrape_all_keeps_order_and_drops_failures() {
        let mut server = mockito::Server::new_async().await;
        let _a = server
            .mock("GET", "/a")
            .with_status(200)
            .with_body(ARTICLE)
            .create_async()
            .await;
        let _b = server.mock("GET", "/b").with_status(500).create_async().await;
        let _c = server
            .mock("GET", "/c")
            .with_status(200)
            .with_body(ARTICLE)
            .create_async()
            .await;

        let urls = vec![
            format!("{}/a", server.url()),
            format!("{}/b", server.url()),
            "http://127.0.0.1:1/unreachable".to_string(),
            format!("{}/c", server.url()),
        ];
        let articles = scraper().scrape_all(&urls).await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].url, urls[0]);
        assert_eq!(articles[1].url, urls[3]);
    }

    #[tokio::test]
    async fn test_scrape_all_empty() {
        assert!(scraper().scrape_all(&[]).await.is_empty());
    }
}
