//! TruthLens: claim verification against live web sources
//!
//! A claim goes through web search (with an ordered query fallback chain),
//! article scraping, extractive summarization and claim-to-summary
//! similarity, and comes out as a verdict with its sources and a visual.

pub mod api;
pub mod circuit_breaker;
pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod scrape;
pub mod search;
pub mod similarity;
pub mod summarize;
pub mod telemetry;
pub mod text;
pub mod verdict;
pub mod visuals;

pub use config::Config;
pub use error::{Result, TruthLensError};
pub use pipeline::{FactCheckReport, FactChecker};
pub use verdict::Verdict;
