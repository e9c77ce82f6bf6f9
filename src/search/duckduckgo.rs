//! DuckDuckGo HTML search (no API key required)

use super::{SearchHit, SearchProvider};
use crate::config::SearchConfig;
use crate::error::{Result, TruthLensError};
use crate::scrape::extract::selector;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Search provider backed by the DuckDuckGo HTML endpoint
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.duckduckgo_url.clone(),
        })
    }

    /// Parse result anchors out of a DuckDuckGo HTML results page
    pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let document = Html::parse_document(html);
        let result_selector = selector("div.result")?;
        let link_selector = selector("a.result__a")?;
        let snippet_selector = selector(".result__snippet")?;

        let mut hits = Vec::new();
        for result in document.select(&result_selector) {
            if is_ad(&result) {
                continue;
            }
            let Some(link) = result.select(&link_selector).next() else {
                continue;
            };
            let Some(url) = link.value().attr("href").and_then(resolve_result_href) else {
                continue;
            };

            let title = element_text(&link);
            let snippet = result
                .select(&snippet_selector)
                .next()
                .map(|s| element_text(&s))
                .unwrap_or_default();

            hits.push(SearchHit { url, title, snippet });
            if hits.len() >= max_results {
                break;
            }
        }

        Ok(hits)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        debug!("Searching DuckDuckGo: {}", query);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TruthLensError::Upstream {
                service: "duckduckgo",
                status: status.as_u16(),
                body,
            });
        }

        let html = response.text().await?;
        let hits = Self::parse_results(&html, max_results)?;
        debug!("DuckDuckGo returned {} results", hits.len());
        Ok(hits)
    }
}

fn is_ad(result: &ElementRef<'_>) -> bool {
    result.value().classes().any(|c| c == "result--ad")
}

fn element_text(element: &ElementRef<'_>) -> String {
    crate::text::collapse_whitespace(&element.text().collect::<String>())
}

/// Turn a result href into the target URL
///
/// DuckDuckGo wraps targets in `//duckduckgo.com/l/?uddg=<encoded target>`.
fn resolve_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    let is_redirect = parsed
        .host_str()
        .map_or(false, |h| h.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");

    let target = if is_redirect {
        let uddg = parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())?;
        Url::parse(&uddg).ok()?
    } else {
        parsed
    };

    match target.scheme() {
        "http" | "https" => Some(target.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r##"
        <html><body>
          <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example/buy">Sponsored</a>
          </div>
          <div class="result results_links">
            <h2 class="result__title">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.isro.gov.in%2FChandrayaan3.html&amp;rut=abc">
                Chandrayaan-3 &amp; the <b>Moon</b>
              </a>
            </h2>
            <a class="result__snippet" href="#">ISRO's third lunar mission.</a>
          </div>
          <div class="result results_links">
            <a class="result__a" href="https://www.bbc.com/news/world-asia-india-66594520">India lands on the Moon</a>
          </div>
          <div class="result results_links">
            <a class="result__a" href="ftp://files.example/archive">Archive</a>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_results_skips_ads_and_decodes_redirects() {
        let hits = DuckDuckGoSearch::parse_results(RESULTS_PAGE, 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://www.isro.gov.in/Chandrayaan3.html");
        assert_eq!(hits[0].title, "Chandrayaan-3 & the Moon");
        assert_eq!(hits[0].snippet, "ISRO's third lunar mission.");
        assert_eq!(hits[1].url, "https://www.bbc.com/news/world-asia-india-66594520");
        assert!(hits[1].snippet.is_empty());
    }

    #[test]
    fn test_parse_results_respects_max() {
        let hits = DuckDuckGoSearch::parse_results(RESULTS_PAGE, 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_resolve_result_href() {
        assert_eq!(
            resolve_result_href("/l/?uddg=https%3A%2F%2Fexample.org%2Fa%3Fb%3D1"),
            Some("https://example.org/a?b=1".to_string())
        );
        assert_eq!(resolve_result_href("mailto:someone@example.org"), None);
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "moon landing".into()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(RESULTS_PAGE)
            .create_async()
            .await;

        let config = SearchConfig {
            duckduckgo_url: format!("{}/html/", server.url()),
            ..SearchConfig::default()
        };
        let provider = DuckDuckGoSearch::new(&config).unwrap();
        let hits = provider.search("moon landing", 10).await.unwrap();

        mock.assert_async().await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let config = SearchConfig {
            duckduckgo_url: format!("{}/html/", server.url()),
            ..SearchConfig::default()
        };
        let provider = DuckDuckGoSearch::new(&config).unwrap();
        let err = provider.search("anything", 10).await.unwrap_err();
        assert!(matches!(err, TruthLensError::Upstream { status: 429, .. }));
    }
}
