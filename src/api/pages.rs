//! Server-rendered HTML pages

use crate::error::Result;
use crate::pipeline::FactCheckReport;
use crate::verdict::Verdict;
use crate::visuals::Visual;
use handlebars::Handlebars;
use serde::Serialize;

const INDEX: &str = "index";
const ABOUT: &str = "about";

/// Handlebars registry with the embedded templates
pub struct Pages {
    registry: Handlebars<'static>,
    max_claim_chars: usize,
}

#[derive(Debug, Serialize)]
struct IndexView<'a> {
    claim: &'a str,
    error: Option<&'a str>,
    max_claim_chars: usize,
    result: Option<ResultView>,
}

#[derive(Debug, Serialize)]
struct ResultView {
    verdict_label: String,
    verdict_class: &'static str,
    confidence: String,
    source_count: usize,
    elapsed_ms: u64,
    visual_src: Option<String>,
    visual_alt: &'static str,
    sources: Vec<SourceRow>,
}

#[derive(Debug, Serialize)]
struct SourceRow {
    url: String,
    title: Option<String>,
    /// Empty for sources that were found but not analyzed
    similarity: String,
}

#[derive(Debug, Serialize)]
struct AboutView {
    version: &'static str,
}

impl Pages {
    pub fn new(max_claim_chars: usize) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_partial("header", include_str!("../../templates/partials/header.hbs"))?;
        registry.register_partial("footer", include_str!("../../templates/partials/footer.hbs"))?;
        registry.register_template_string(INDEX, include_str!("../../templates/index.hbs"))?;
        registry.register_template_string(ABOUT, include_str!("../../templates/about.hbs"))?;

        Ok(Self {
            registry,
            max_claim_chars,
        })
    }

    /// Empty claim form, optionally with an error message
    pub fn form(&self, claim: &str, error: Option<&str>) -> Result<String> {
        Ok(self.registry.render(
            INDEX,
            &IndexView {
                claim,
                error,
                max_claim_chars: self.max_claim_chars,
                result: None,
            },
        )?)
    }

    pub fn result(&self, report: &FactCheckReport) -> Result<String> {
        Ok(self.registry.render(
            INDEX,
            &IndexView {
                claim: &report.claim,
                error: None,
                max_claim_chars: self.max_claim_chars,
                result: Some(ResultView::from(report)),
            },
        )?)
    }

    pub fn about(&self) -> Result<String> {
        Ok(self.registry.render(
            ABOUT,
            &AboutView {
                version: env!("CARGO_PKG_VERSION"),
            },
        )?)
    }
}

impl From<&FactCheckReport> for ResultView {
    fn from(report: &FactCheckReport) -> Self {
        let sources = if report.sources.is_empty() {
            report
                .source_urls
                .iter()
                .map(|url| SourceRow {
                    url: url.clone(),
                    title: None,
                    similarity: String::new(),
                })
                .collect()
        } else {
            report
                .sources
                .iter()
                .map(|s| SourceRow {
                    url: s.url.clone(),
                    title: s.title.clone(),
                    similarity: format!("{:.0}%", s.similarity * 100.0),
                })
                .collect()
        };

        let (visual_src, visual_alt) = match &report.visual {
            Some(Visual::HeroImage(src)) => (Some(src.clone()), "News image"),
            Some(Visual::WordCloud(src)) => (Some(src.clone()), "Word cloud of source summaries"),
            None => (None, ""),
        };

        Self {
            verdict_label: report.verdict_label.clone(),
            verdict_class: verdict_class(report.verdict),
            confidence: report.confidence.clone(),
            source_count: report.source_urls.len(),
            elapsed_ms: report.elapsed_ms,
            visual_src,
            visual_alt,
            sources,
        }
    }
}

/// CSS class the frontends use to colour the verdict card
fn verdict_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::TrueHighConfidence => "v-strong-true",
        Verdict::LikelyTrue => "v-likely-true",
        Verdict::Fake | Verdict::FakeHateSpeech | Verdict::FakeProfanity => "v-fake",
        Verdict::Unverified | Verdict::InsufficientData | Verdict::SourcesFoundUnanalyzed => {
            "v-unverified"
        }
    }
}
