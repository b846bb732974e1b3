//! Rendering sessions
//!
//! A session is one browser process plus one page, owned by exactly one
//! adapter invocation. Sessions are never pooled or shared: the adapter opens
//! one through a [`SessionFactory`], drives it strictly sequentially, and
//! closes it on every exit path.
//!
//! # State machine
//! ```text
//! Uninitialized -> Launching -> Ready <-> Navigating
//!                      |          |           |
//!                      +----------+-----------+--> Closed (terminal)
//! ```

pub mod blocking;
pub mod chromium;
pub mod navigation;
pub mod page_timeout;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::error::ScrapeResult;

pub use chromium::{ChromiumSession, ChromiumSessionFactory};
pub use navigation::{PageLoader, is_usable_document, navigate_with_fallback};
pub use page_timeout::with_page_timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Launching,
    Ready,
    Navigating,
    Closed,
}

impl SessionState {
    /// Whether the state machine permits moving from `self` to `next`
    #[must_use]
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::{Closed, Launching, Navigating, Ready, Uninitialized};
        matches!(
            (self, next),
            (Uninitialized, Launching)
                | (Launching, Ready)
                | (Ready, Navigating)
                | (Navigating, Ready)
                | (Launching | Ready | Navigating, Closed)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == SessionState::Closed
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Launching => "launching",
            Self::Ready => "ready",
            Self::Navigating => "navigating",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// How long a navigation waits before it is considered complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Wait for the `load` event
    Load,
    /// Return once the document is committed and parsed far enough to query
    Commit,
}

/// Bounded navigation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateOptions {
    pub primary_timeout: Duration,
    pub fallback_timeout: Duration,
    /// A timed-out document at least this long (and with a body) is used as-is
    pub min_usable_bytes: usize,
}

impl NavigateOptions {
    #[must_use]
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            primary_timeout: config.primary_navigation_timeout(),
            fallback_timeout: config.fallback_navigation_timeout(),
            min_usable_bytes: config.min_usable_document_bytes(),
        }
    }
}

/// How a navigation ended up producing a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Primary strategy completed
    Loaded,
    /// Primary strategy failed but the partial document was usable
    Partial,
    /// Primary strategy failed, permissive retry completed
    Fallback,
}

/// One exclusively-owned rendering session
#[async_trait]
pub trait RenderSession: Send {
    /// Identifier used in logs
    fn id(&self) -> &str;

    fn state(&self) -> SessionState;

    /// Load `url` with the bounded primary/fallback strategy
    ///
    /// Fails with `ScrapeError::Navigation` only when both strategies failed
    /// and no usable partial document exists.
    async fn navigate(&mut self, url: &str, options: &NavigateOptions)
    -> ScrapeResult<NavigationOutcome>;

    /// Serialized DOM of the current document
    async fn content(&mut self) -> ScrapeResult<String>;

    /// URL the page currently shows, after redirects
    async fn current_url(&mut self) -> Option<String>;

    /// Release the browser. Idempotent: only the first call has an effect.
    async fn close(&mut self);
}

/// Creates ready-to-navigate sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> ScrapeResult<Box<dyn RenderSession>>;
}
