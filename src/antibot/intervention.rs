//! Bounded wait for an operator to clear a challenge
//!
//! When a challenge is detected the session stays open (visible when the
//! browser runs headful) and the page is re-checked on a fixed interval. The
//! wait never exceeds its ceiling; a page still challenged at the deadline is
//! reported as blocked and the caller degrades to an empty result.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::ChallengeDetector;
use crate::config::ScraperConfig;
use crate::error::ScrapeResult;
use crate::session::RenderSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterventionPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl InterventionPolicy {
    #[must_use]
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.intervention_timeout(),
            poll_interval: config.intervention_poll_interval(),
        }
    }
}

/// Result of checking a freshly navigated page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// No challenge; carries the document that was checked
    Clear(String),
    /// A challenge was present and cleared during the wait
    Resolved(String),
    /// Still challenged once the wait expired
    Blocked,
}

impl ChallengeOutcome {
    /// The usable document, if any
    #[must_use]
    pub fn into_document(self) -> Option<String> {
        match self {
            Self::Clear(html) | Self::Resolved(html) => Some(html),
            Self::Blocked => None,
        }
    }
}

/// Check the current page and, if challenged, wait up to `policy.timeout`
/// for it to clear
///
/// A zero timeout means no wait: a challenged page is immediately `Blocked`.
pub async fn await_intervention(
    session: &mut dyn RenderSession,
    detector: &ChallengeDetector,
    policy: &InterventionPolicy,
) -> ScrapeResult<ChallengeOutcome> {
    let html = session.content().await?;
    let url = session.current_url().await;
    if !detector.is_challenge_page(&html, url.as_deref()) {
        return Ok(ChallengeOutcome::Clear(html));
    }

    warn!(
        "Session {}: challenge detected at {}, awaiting intervention for up to {}s",
        session.id(),
        url.as_deref().unwrap_or("<unknown>"),
        policy.timeout.as_secs()
    );

    let deadline = Instant::now() + policy.timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(policy.poll_interval.min(remaining)).await;

        let html = session.content().await?;
        let url = session.current_url().await;
        if !detector.is_challenge_page(&html, url.as_deref()) {
            info!("Session {}: challenge cleared", session.id());
            return Ok(ChallengeOutcome::Resolved(html));
        }
    }

    warn!(
        "Session {}: still challenged after {}s, giving up",
        session.id(),
        policy.timeout.as_secs()
    );
    Ok(ChallengeOutcome::Blocked)
}
