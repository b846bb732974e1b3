//! Per-source circuit breaker
//!
//! A source that keeps failing (errors or exhausted time budget) is skipped
//! for a cooldown period instead of costing a browser launch on every query.
//!
//! - Closed: the source is queried
//! - Open: the source is skipped until the cooldown has elapsed
//! - `HalfOpen`: one probe is let through; success closes, failure reopens

use dashmap::DashMap;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    HalfOpen,
    Open,
}

/// Failure bookkeeping for one source
#[derive(Debug, Clone)]
pub struct SourceHealth {
    pub consecutive_failures: u32,
    pub total_calls: u32,
    pub total_failures: u32,
    /// When the circuit last opened
    pub opened_at: Option<Instant>,
    pub state: CircuitState,
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self {
            consecutive_failures: 0,
            total_calls: 0,
            total_failures: 0,
            opened_at: None,
            state: CircuitState::Closed,
        }
    }
}

pub struct CircuitBreaker {
    sources: DashMap<String, SourceHealth>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            sources: DashMap::new(),
            failure_threshold: failure_threshold.max(1),
            cooldown,
        }
    }

    /// Whether `source` should be queried now
    ///
    /// An open circuit whose cooldown has elapsed moves to half-open and lets
    /// the call through.
    pub fn should_attempt(&self, source: &str) -> bool {
        let mut health = self.sources.entry(source.to_string()).or_default();

        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => match health.opened_at {
                Some(opened) if opened.elapsed() >= self.cooldown => {
                    health.state = CircuitState::HalfOpen;
                    info!(
                        "Circuit HALF-OPEN for source {source} after {:?}",
                        opened.elapsed()
                    );
                    true
                }
                _ => false,
            },
        }
    }

    /// A completed call, including one that found nothing
    pub fn record_success(&self, source: &str) {
        let mut health = self.sources.entry(source.to_string()).or_default();
        health.consecutive_failures = 0;
        health.total_calls += 1;

        if health.state != CircuitState::Closed {
            health.state = CircuitState::Closed;
            health.opened_at = None;
            info!("Circuit CLOSED for source {source}");
        }
    }

    pub fn record_failure(&self, source: &str, error: &str) {
        let mut health = self.sources.entry(source.to_string()).or_default();
        health.consecutive_failures += 1;
        health.total_calls += 1;
        health.total_failures += 1;

        let reopen = health.state == CircuitState::HalfOpen;
        if reopen || (health.state == CircuitState::Closed && health.consecutive_failures >= self.failure_threshold) {
            health.state = CircuitState::Open;
            health.opened_at = Some(Instant::now());
            warn!(
                "Circuit OPEN for source {source} after {} consecutive failures. Last error: {error}",
                health.consecutive_failures
            );
        } else {
            debug!(
                "Source {source} failure ({}/{}): {error}",
                health.consecutive_failures, self.failure_threshold
            );
        }
    }

    #[must_use]
    pub fn health(&self, source: &str) -> Option<SourceHealth> {
        self.sources.get(source).map(|entry| entry.value().clone())
    }

    /// Sources currently skipped
    #[must_use]
    pub fn open_sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|entry| entry.value().state == CircuitState::Open)
            .map(|entry| entry.key().clone())
            .collect()
    }
}
