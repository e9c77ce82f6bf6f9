//! Metrics collection for observability

use prometheus::{
    Counter, CounterVec, HistogramOpts, HistogramVec, Opts, Registry,
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry,
};
use std::sync::Arc;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Verdicts
    pub verifications: CounterVec,

    // Pipeline stages
    pub search_attempts: CounterVec,
    pub scrape_results: CounterVec,
    pub summaries: CounterVec,
    pub upstream_errors: CounterVec,
    pub stage_duration: HistogramVec,

    // Report cache
    pub cache_hits: Counter,
    pub cache_misses: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let verifications = register_counter_vec_with_registry!(
            Opts::new("truthlens_verifications_total", "Total claims verified by verdict"),
            &["verdict"],
            registry
        )?;

        let search_attempts = register_counter_vec_with_registry!(
            Opts::new("truthlens_search_attempts_total", "Search attempts by query strategy"),
            &["strategy", "outcome"],
            registry
        )?;

        let scrape_results = register_counter_vec_with_registry!(
            Opts::new("truthlens_scrape_results_total", "Scraped URLs by outcome"),
            &["outcome"],
            registry
        )?;

        let summaries = register_counter_vec_with_registry!(
            Opts::new("truthlens_summaries_total", "Article summaries by method"),
            &["method"],
            registry
        )?;

        let upstream_errors = register_counter_vec_with_registry!(
            Opts::new("truthlens_upstream_errors_total", "Failed calls to upstream services"),
            &["service"],
            registry
        )?;

        let stage_duration = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "truthlens_stage_duration_seconds",
                "Pipeline stage duration in seconds"
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["stage"],
            registry
        )?;

        let cache_hits = register_counter_with_registry!(
            Opts::new("truthlens_cache_hits_total", "Report cache hits"),
            registry
        )?;

        let cache_misses = register_counter_with_registry!(
            Opts::new("truthlens_cache_misses_total", "Report cache misses"),
            registry
        )?;

        Ok(Self {
            registry,
            verifications,
            search_attempts,
            scrape_results,
            summaries,
            upstream_errors,
            stage_duration,
            cache_hits,
            cache_misses,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_verdict(&self, verdict: &str) {
        self.verifications.with_label_values(&[verdict]).inc();
    }

    pub fn record_search_attempt(&self, strategy: &str, outcome: &str) {
        self.search_attempts.with_label_values(&[strategy, outcome]).inc();
    }

    pub fn record_scrape(&self, outcome: &str) {
        self.scrape_results.with_label_values(&[outcome]).inc();
    }

    pub fn record_summary(&self, method: &str) {
        self.summaries.with_label_values(&[method]).inc();
    }

    pub fn record_upstream_error(&self, service: &str) {
        self.upstream_errors.with_label_values(&[service]).inc();
    }

    pub fn observe_stage(&self, stage: &str, seconds: f64) {
        self.stage_duration.with_label_values(&[stage]).observe(seconds);
    }

    pub fn record_cache(&self, hit: bool) {
        if hit {
            self.cache_hits.inc();
        } else {
            self.cache_misses.inc();
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Helper macro to time a pipeline stage
#[macro_export]
macro_rules! time_stage {
    ($stage:expr, $operation:expr) => {{
        let timer = $crate::metrics::METRICS
            .stage_duration
            .with_label_values(&[$stage])
            .start_timer();
        let result = $operation;
        timer.observe_duration();
        result
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_export_contains_recorded_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_verdict("fake");
        metrics.record_search_attempt("direct", "empty");
        metrics.record_cache(true);

        let exported = metrics.export_prometheus();
        assert!(exported.contains("truthlens_verifications_total"));
        assert!(exported.contains("verdict=\"fake\""));
        assert!(exported.contains("strategy=\"direct\""));
        assert!(exported.contains("truthlens_cache_hits_total 1"));
    }
}
