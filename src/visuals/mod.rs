//! Result page visuals: a source photo, or a word cloud when none exists

pub mod word_cloud;

pub use word_cloud::WordCloud;

use crate::scrape::Article;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

/// Image shown next to the verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum Visual {
    /// Share image of a scraped source
    HeroImage(String),
    /// Data URI of a generated SVG
    WordCloud(String),
}

impl Visual {
    pub fn src(&self) -> &str {
        match self {
            Visual::HeroImage(src) | Visual::WordCloud(src) => src,
        }
    }
}

/// First share image among the scraped articles
pub fn hero_image(articles: &[Article]) -> Option<String> {
    articles.iter().find_map(|a| a.image_url.clone())
}

pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

/// Pick the visual for a report, rendering a word cloud only when no
/// article carries an image
pub fn select_visual(articles: &[Article], summaries: &[String], cloud: &WordCloud) -> Visual {
    match hero_image(articles) {
        Some(url) => Visual::HeroImage(url),
        None => Visual::WordCloud(svg_data_uri(&cloud.render(&summaries.join(" ")))),
    }
}
