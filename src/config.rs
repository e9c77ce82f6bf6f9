//! Layered service configuration
//!
//! Precedence, lowest first: built-in defaults, an optional TOML file
//! (`truthlens.toml` or the path in `TRUTHLENS_CONFIG`), then environment
//! variables such as `TRUTHLENS__SERVER__PORT=9000`. A `.env` file is
//! loaded before the environment is read.

use crate::error::{Result, TruthLensError};
use crate::search::QueryStrategy;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "TRUTHLENS";
const CONFIG_PATH_VAR: &str = "TRUTHLENS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "truthlens.toml";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub verdict: VerdictConfig,
    #[serde(default)]
    pub visuals: VisualsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `.env`, the config file and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&path)
    }

    /// Load from an optional TOML file plus environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the pipeline inconsistent
    pub fn validate(&self) -> Result<()> {
        let v = &self.verdict;
        for (name, value) in [
            ("true_threshold", v.true_threshold),
            ("likely_threshold", v.likely_threshold),
            ("fake_threshold", v.fake_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TruthLensError::Configuration(format!(
                    "verdict.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if v.fake_threshold >= v.likely_threshold {
            return Err(TruthLensError::Configuration(
                "verdict.fake_threshold must be below verdict.likely_threshold".to_string(),
            ));
        }
        if v.likely_threshold > v.true_threshold {
            return Err(TruthLensError::Configuration(
                "verdict.likely_threshold cannot exceed verdict.true_threshold".to_string(),
            ));
        }
        if self.search.strategies.is_empty() {
            return Err(TruthLensError::Configuration(
                "search.strategies cannot be empty".to_string(),
            ));
        }
        if self.search.timeout_ms == 0 || self.scraper.timeout_ms == 0 {
            return Err(TruthLensError::Configuration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.scraper.max_concurrency == 0 {
            return Err(TruthLensError::Configuration(
                "scraper.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(TruthLensError::Configuration(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Claims longer than this are rejected
    #[serde(default = "default_max_claim_chars")]
    pub max_claim_chars: usize,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_max_body_bytes() -> usize { 64 * 1024 }
fn default_max_claim_chars() -> usize { 1000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            max_claim_chars: default_max_claim_chars(),
        }
    }
}

/// Which search backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    DuckDuckGo,
    Tavily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_backend")]
    pub provider: SearchBackend,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
    #[serde(default = "default_search_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<QueryStrategy>,
    #[serde(default = "default_keyword_suffix")]
    pub keyword_suffix: String,
    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,
    #[serde(default = "default_tavily_url")]
    pub tavily_url: String,
    #[serde(default)]
    pub tavily_api_key: Option<SecretString>,
}

fn default_search_backend() -> SearchBackend { SearchBackend::DuckDuckGo }
fn default_num_results() -> usize { 10 }
fn default_search_timeout_ms() -> u64 { 8000 }
fn default_keyword_suffix() -> String { "news fact check".to_string() }
fn default_duckduckgo_url() -> String { "https://html.duckduckgo.com/html/".to_string() }
fn default_tavily_url() -> String { "https://api.tavily.com/search".to_string() }

fn default_strategies() -> Vec<QueryStrategy> {
    vec![
        QueryStrategy::Direct,
        QueryStrategy::Simplified,
        QueryStrategy::KeywordAppended,
        QueryStrategy::Entities,
    ]
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_backend(),
            num_results: default_num_results(),
            timeout_ms: default_search_timeout_ms(),
            strategies: default_strategies(),
            keyword_suffix: default_keyword_suffix(),
            duckduckgo_url: default_duckduckgo_url(),
            tavily_url: default_tavily_url(),
            tavily_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_scrape_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Text blocks at or below this length are ignored
    #[serde(default = "default_min_block_chars")]
    pub min_block_chars: usize,
    /// Articles at or below this length are skipped
    #[serde(default = "default_min_article_chars")]
    pub min_article_chars: usize,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_scrape_timeout_ms() -> u64 { 5000 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36".to_string()
}
fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string()
}
fn default_accept_language() -> String { "en-US,en;q=0.5".to_string() }
fn default_min_block_chars() -> usize { 30 }
fn default_min_article_chars() -> usize { 100 }
fn default_max_concurrency() -> usize { 4 }

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_scrape_timeout_ms(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            min_block_chars: default_min_block_chars(),
            min_article_chars: default_min_article_chars(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerBackend {
    Lsa,
    Llm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_summarizer_backend")]
    pub backend: SummarizerBackend,
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    /// Raw text kept when summarization yields nothing
    #[serde(default = "default_raw_fallback_chars")]
    pub raw_fallback_chars: usize,
    #[serde(default = "default_llm_endpoint")]
    pub llm_endpoint: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub llm_api_key: Option<SecretString>,
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_llm_retries")]
    pub max_retries: usize,
}

fn default_summarizer_backend() -> SummarizerBackend { SummarizerBackend::Lsa }
fn default_max_sentences() -> usize { 10 }
fn default_raw_fallback_chars() -> usize { 5000 }
fn default_llm_endpoint() -> String { "http://localhost:8080/v1/chat/completions".to_string() }
fn default_llm_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_llm_timeout_ms() -> u64 { 30_000 }
fn default_llm_retries() -> usize { 3 }

impl SummarizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: default_summarizer_backend(),
            max_sentences: default_max_sentences(),
            raw_fallback_chars: default_raw_fallback_chars(),
            llm_endpoint: default_llm_endpoint(),
            llm_model: default_llm_model(),
            llm_api_key: None,
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_llm_retries(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Hashed,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_backend")]
    pub backend: EmbeddingBackend,
    /// Vector size of the local hashed embedder
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_embedding_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_embedding_backend() -> EmbeddingBackend { EmbeddingBackend::Hashed }
fn default_dimensions() -> usize { 1024 }
fn default_embedding_endpoint() -> String { "https://api.openai.com/v1/embeddings".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_embedding_timeout_ms() -> u64 { 10_000 }

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            dimensions: default_dimensions(),
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            api_key: None,
            timeout_ms: default_embedding_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Moderation is skipped entirely when disabled
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli".to_string()
}
fn default_classifier_timeout_ms() -> u64 { 10_000 }

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_classifier_endpoint(),
            api_key: None,
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

/// Similarity cut-offs used to classify a claim
#[derive(Debug, Clone, Deserialize)]
pub struct VerdictConfig {
    #[serde(default = "default_true_threshold")]
    pub true_threshold: f32,
    #[serde(default = "default_likely_threshold")]
    pub likely_threshold: f32,
    #[serde(default = "default_fake_threshold")]
    pub fake_threshold: f32,
    #[serde(default = "default_min_sources_for_fake")]
    pub min_sources_for_fake: usize,
}

fn default_true_threshold() -> f32 { 0.45 }
fn default_likely_threshold() -> f32 { 0.30 }
fn default_fake_threshold() -> f32 { 0.15 }
fn default_min_sources_for_fake() -> usize { 3 }

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            true_threshold: default_true_threshold(),
            likely_threshold: default_likely_threshold(),
            fake_threshold: default_fake_threshold(),
            min_sources_for_fake: default_min_sources_for_fake(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualsConfig {
    #[serde(default = "default_cloud_width")]
    pub width: u32,
    #[serde(default = "default_cloud_height")]
    pub height: u32,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_cloud_width() -> u32 { 800 }
fn default_cloud_height() -> u32 { 500 }
fn default_max_words() -> usize { 60 }
fn default_background() -> String { "#16191f".to_string() }

impl Default for VisualsConfig {
    fn default() -> Self {
        Self {
            width: default_cloud_width(),
            height: default_cloud_height(),
            max_words: default_max_words(),
            background: default_background(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

fn default_cache_enabled() -> bool { true }
fn default_cache_ttl_secs() -> u64 { 900 }
fn default_cache_max_entries() -> u64 { 500 }

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerSettings {
    #[serde(default = "default_breaker_failures")]
    pub failure_threshold: usize,
    #[serde(default = "default_breaker_reset")]
    pub reset_timeout_secs: u64,
}

fn default_breaker_failures() -> usize { 5 }
fn default_breaker_reset() -> u64 { 30 }

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_breaker_failures(),
            reset_timeout_secs: default_breaker_reset(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> LogFormat { LogFormat::Pretty }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
