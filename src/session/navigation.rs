//! Bounded navigation with a permissive fallback
//!
//! 1. Load with the primary strategy under the primary timeout.
//! 2. On failure, keep whatever document loaded if it is usable.
//! 3. Otherwise retry once with the permissive strategy and a shorter timeout.
//! 4. If that fails too, the navigation fails.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::page_timeout::with_page_timeout;
use super::{LoadStrategy, NavigateOptions, NavigationOutcome};
use crate::error::{ScrapeError, ScrapeResult};

/// The two page primitives the fallback routine needs
#[async_trait]
pub trait PageLoader: Send {
    async fn load(&mut self, url: &str, strategy: LoadStrategy) -> anyhow::Result<()>;

    /// Current document, however far it got
    async fn document(&mut self) -> anyhow::Result<String>;
}

/// A partially loaded document is usable when it is non-trivial and has a body
#[must_use]
pub fn is_usable_document(html: &str, min_bytes: usize) -> bool {
    html.len() >= min_bytes && html.to_ascii_lowercase().contains("<body")
}

pub async fn navigate_with_fallback<L>(
    loader: &mut L,
    url: &str,
    options: &NavigateOptions,
) -> ScrapeResult<NavigationOutcome>
where
    L: PageLoader + ?Sized,
{
    let primary = with_page_timeout(
        loader.load(url, LoadStrategy::Load),
        options.primary_timeout,
        "Primary navigation",
    )
    .await;

    let primary_err = match primary {
        Ok(()) => {
            debug!("Loaded {} with primary strategy", url);
            return Ok(NavigationOutcome::Loaded);
        }
        Err(e) => e,
    };

    match loader.document().await {
        Ok(html) if is_usable_document(&html, options.min_usable_bytes) => {
            warn!(
                "Primary navigation to {} failed ({:#}), continuing with partial document ({} bytes)",
                url,
                primary_err,
                html.len()
            );
            return Ok(NavigationOutcome::Partial);
        }
        Ok(html) => debug!("Partial document for {} unusable ({} bytes)", url, html.len()),
        Err(e) => debug!("Could not read partial document for {}: {:#}", url, e),
    }

    warn!(
        "Primary navigation to {} failed ({:#}), retrying with permissive strategy",
        url, primary_err
    );

    with_page_timeout(
        loader.load(url, LoadStrategy::Commit),
        options.fallback_timeout,
        "Fallback navigation",
    )
    .await
    .map(|()| NavigationOutcome::Fallback)
    .map_err(|fallback_err| {
        ScrapeError::navigation(
            url,
            format!("primary: {primary_err:#}; fallback: {fallback_err:#}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Scripted loader: each load pops the next scripted result
    struct ScriptedLoader {
        loads: VecDeque<(Duration, bool)>,
        document: String,
        strategies: Vec<LoadStrategy>,
    }

    #[async_trait]
    impl PageLoader for ScriptedLoader {
        async fn load(&mut self, _url: &str, strategy: LoadStrategy) -> anyhow::Result<()> {
            self.strategies.push(strategy);
            let (delay, ok) = self.loads.pop_front().unwrap_or((Duration::ZERO, false));
            tokio::time::sleep(delay).await;
            if ok { Ok(()) } else { Err(anyhow::anyhow!("net::ERR_CONNECTION_RESET")) }
        }

        async fn document(&mut self) -> anyhow::Result<String> {
            Ok(self.document.clone())
        }
    }

    fn options() -> NavigateOptions {
        NavigateOptions {
            primary_timeout: Duration::from_secs(60),
            fallback_timeout: Duration::from_secs(30),
            min_usable_bytes: 64,
        }
    }

    fn loader(loads: &[(u64, bool)], document: &str) -> ScriptedLoader {
        ScriptedLoader {
            loads: loads.iter().map(|(s, ok)| (Duration::from_secs(*s), *ok)).collect(),
            document: document.to_string(),
            strategies: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn primary_success() {
        let mut l = loader(&[(1, true)], "");
        let outcome = navigate_with_fallback(&mut l, "https://shop.test", &options()).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Loaded);
        assert_eq!(l.strategies, vec![LoadStrategy::Load]);
    }

    #[tokio::test(start_paused = true)]
    async fn usable_partial_document_skips_fallback() {
        let doc = format!("<html><body>{}</body></html>", "x".repeat(100));
        let mut l = loader(&[(120, true)], &doc);
        let outcome = navigate_with_fallback(&mut l, "https://shop.test", &options()).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Partial);
        assert_eq!(l.strategies, vec![LoadStrategy::Load]);
    }

    #[tokio::test(start_paused = true)]
    async fn unusable_document_triggers_permissive_retry() {
        let mut l = loader(&[(0, false), (1, true)], "<html></html>");
        let outcome = navigate_with_fallback(&mut l, "https://shop.test", &options()).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Fallback);
        assert_eq!(l.strategies, vec![LoadStrategy::Load, LoadStrategy::Commit]);
    }

    #[tokio::test(start_paused = true)]
    async fn both_strategies_failing_is_navigation_error() {
        let mut l = loader(&[(0, false), (31, true)], "");
        let err = navigate_with_fallback(&mut l, "https://shop.test", &options()).await.unwrap_err();
        match err {
            ScrapeError::Navigation { url, reason } => {
                assert_eq!(url, "https://shop.test");
                assert!(reason.contains("Fallback navigation timeout"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn usable_document_rules() {
        assert!(is_usable_document("<HTML><BODY>abc</BODY></HTML>", 10));
        assert!(!is_usable_document("<html><head></head></html>", 10));
        assert!(!is_usable_document("<body>", 10));
    }
}
