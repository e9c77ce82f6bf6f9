//! HTML text extraction

use crate::error::{Result, TruthLensError};
use crate::text::collapse_whitespace;
use scraper::{Html, Selector};
use url::Url;

const TEXT_BLOCKS: &str = "p, h1, h2, article";
const IMAGE_META: [&str; 2] = [
    r#"meta[property="og:image"]"#,
    r#"meta[name="twitter:image"]"#,
];

/// Content pulled out of one HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
    pub image_url: Option<String>,
}

/// Extract readable text, title and share image from an HTML document
///
/// Text blocks at or below `min_block_chars` characters (menus, captions,
/// bylines) are dropped.
pub fn extract_page(html: &str, page_url: &str, min_block_chars: usize) -> Result<ExtractedPage> {
    let document = Html::parse_document(html);

    let blocks = selector(TEXT_BLOCKS)?;
    let text = document
        .select(&blocks)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|block| block.chars().count() > min_block_chars)
        .collect::<Vec<_>>()
        .join(" ");

    let title_selector = selector("title")?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let mut image_url = None;
    for css in IMAGE_META {
        let meta = selector(css)?;
        let found = document
            .select(&meta)
            .filter_map(|el| el.value().attr("content"))
            .find_map(|content| resolve_image(page_url, content));
        if found.is_some() {
            image_url = found;
            break;
        }
    }

    Ok(ExtractedPage {
        title,
        text,
        image_url,
    })
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TruthLensError::Parse(format!("invalid selector {}: {:?}", css, e)))
}

fn resolve_image(page_url: &str, content: &str) -> Option<String> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    let resolved = match Url::parse(content) {
        Ok(absolute) => absolute,
        Err(_) => Url::parse(page_url).ok()?.join(content).ok()?,
    };
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title>  Chandrayaan-3 lands on the Moon | News </title>
            <meta property="og:image" content="/images/lander.jpg">
            <meta name="twitter:image" content="https://cdn.example/twitter.jpg">
          </head>
          <body>
            <nav><p>Home</p></nav>
            <h1>India becomes the first nation to land near the lunar south pole</h1>
            <p>Short caption.</p>
            <p>The Vikram lander touched down on 23 August 2023,
               ISRO confirmed in a statement.</p>
          </body>
        </html>
    "#;

    #[test]
    fn test_extract_keeps_long_blocks_only() {
        let page = extract_page(PAGE, "https://news.example/space/story", 30).unwrap();
        assert_eq!(
            page.text,
            "India becomes the first nation to land near the lunar south pole \
             The Vikram lander touched down on 23 August 2023, ISRO confirmed in a statement."
        );
        assert!(!page.text.contains("Short caption"));
        assert!(!page.text.contains("Home"));
    }

    #[test]
    fn test_extract_title_and_relative_og_image() {
        let page = extract_page(PAGE, "https://news.example/space/story", 30).unwrap();
        assert_eq!(page.title.as_deref(), Some("Chandrayaan-3 lands on the Moon | News"));
        assert_eq!(page.image_url.as_deref(), Some("https://news.example/images/lander.jpg"));
    }

    #[test]
    fn test_twitter_image_fallback() {
        let html = r#"<html><head><meta name="twitter:image" content="https://cdn.example/t.jpg"></head></html>"#;
        let page = extract_page(html, "https://news.example/", 30).unwrap();
        assert_eq!(page.image_url.as_deref(), Some("https://cdn.example/t.jpg"));
        assert!(page.text.is_empty());
        assert!(page.title.is_none());
    }

    #[test]
    fn test_non_http_image_is_ignored() {
        let html = r#"<html><head><meta property="og:image" content="data:image/png;base64,AAAA"></head></html>"#;
        let page = extract_page(html, "https://news.example/", 30).unwrap();
        assert!(page.image_url.is_none());
    }
}
