//! Circuit breaker for upstream service protection

use crate::config::CircuitBreakerSettings;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,   // Normal operation
    Open,     // Failing, reject requests
    HalfOpen, // Testing if service recovered
}

#[derive(Debug, Clone)]
struct BreakerEntry {
    state: BreakerState,
    failure_count: usize,
    opened_at: Option<Instant>,
}

impl BreakerEntry {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &CircuitBreakerSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold.max(1),
            reset_timeout: Duration::from_secs(settings.reset_timeout_secs),
        }
    }
}

/// Per-operation circuit breakers for the search, embedding and classifier upstreams
#[derive(Debug)]
pub struct CircuitBreaker {
    breakers: DashMap<String, BreakerEntry>,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            config,
        }
    }

    /// Check if the circuit is open for an operation
    pub fn is_open(&self, operation: &str) -> bool {
        let mut guard = self
            .breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);
        let entry = guard.value_mut();

        match entry.state {
            BreakerState::Closed | BreakerState::HalfOpen => false,
            BreakerState::Open => match entry.opened_at {
                Some(opened_at) if opened_at.elapsed() >= self.config.reset_timeout => {
                    entry.state = BreakerState::HalfOpen;
                    false
                }
                _ => true,
            },
        }
    }

    /// Mark a successful operation
    pub fn mark_success(&self, operation: &str) {
        self.breakers
            .insert(operation.to_string(), BreakerEntry::new());
    }

    /// Mark a failed operation
    pub fn mark_failure(&self, operation: &str) {
        let mut guard = self
            .breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);
        let entry = guard.value_mut();

        entry.failure_count += 1;

        // A failed probe while half-open reopens immediately
        if entry.failure_count >= self.config.failure_threshold
            || entry.state == BreakerState::HalfOpen
        {
            entry.state = BreakerState::Open;
            entry.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self, operation: &str) -> BreakerState {
        self.breakers
            .get(operation)
            .map(|e| e.state)
            .unwrap_or(BreakerState::Closed)
    }
}
