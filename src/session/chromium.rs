//! Chromium-backed rendering session

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::page::Page;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::navigation::{PageLoader, navigate_with_fallback};
use super::page_timeout::with_page_timeout;
use super::{
    LoadStrategy, NavigateOptions, NavigationOutcome, RenderSession, SessionFactory, SessionState,
    blocking,
};
use crate::browser_profile::{BrowserProfile, cleanup_stale_profiles, create_profile};
use crate::browser_setup::{LaunchOptions, WINDOW_SIZE, launch_browser};
use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::kromekover::{self, StealthProfile};
use crate::utils::constants::USER_AGENTS;

/// Upper bound for the browser to acknowledge a close request
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for a committed document to become queryable
const READY_STATE_POLL: Duration = Duration::from_millis(250);

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Drives one chromiumoxide page through the two load strategies
struct ChromiumLoader {
    page: Page,
}

#[async_trait]
impl PageLoader for ChromiumLoader {
    async fn load(&mut self, url: &str, strategy: LoadStrategy) -> anyhow::Result<()> {
        match strategy {
            LoadStrategy::Load => {
                self.page.goto(url).await?;
            }
            LoadStrategy::Commit => {
                self.page.execute(NavigateParams::new(url)).await?;
                loop {
                    let state: String = self
                        .page
                        .evaluate("document.readyState")
                        .await?
                        .into_value()?;
                    if state != "loading" {
                        break;
                    }
                    tokio::time::sleep(READY_STATE_POLL).await;
                }
            }
        }
        Ok(())
    }

    async fn document(&mut self) -> anyhow::Result<String> {
        Ok(self.page.content().await?)
    }
}

/// One browser process with one stealth-configured page
///
/// Must be closed with [`RenderSession::close`]. Dropping an open session
/// kills the browser process without a graceful shutdown.
pub struct ChromiumSession {
    id: String,
    state: SessionState,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    interceptor: Option<JoinHandle<()>>,
    page: Option<Page>,
    profile: Option<BrowserProfile>,
}

impl ChromiumSession {
    /// Launch a browser and prepare its page; ends in `Ready`
    ///
    /// Anything started before a launch failure is released before the
    /// error is returned.
    pub async fn launch(config: &ScraperConfig) -> ScrapeResult<Self> {
        let mut session = Self {
            id: uuid::Uuid::new_v4().simple().to_string()[..8].to_string(),
            state: SessionState::Uninitialized,
            browser: None,
            handler: None,
            interceptor: None,
            page: None,
            profile: None,
        };

        session.transition(SessionState::Launching);
        match session.start(config).await {
            Ok(()) => {
                session.transition(SessionState::Ready);
                Ok(session)
            }
            Err(e) => {
                session.close().await;
                Err(ScrapeError::Browser(format!("{e:#}")))
            }
        }
    }

    async fn start(&mut self, config: &ScraperConfig) -> anyhow::Result<()> {
        let user_agent = pick_user_agent();
        let profile = create_profile(config.chrome_data_dir())?;

        let (browser, handler) = launch_browser(&LaunchOptions {
            headless: config.headless(),
            user_data_dir: profile.path(),
            user_agent,
        })
        .await?;
        self.profile = Some(profile);
        self.handler = Some(handler);
        let browser = self.browser.insert(browser);

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        if let Err(e) = kromekover::inject(&page, &StealthProfile::for_user_agent(user_agent)).await {
            warn!("Session {}: stealth injection failed: {:#}", self.id, e);
        }

        let (width, height) = WINDOW_SIZE;
        page.execute(
            SetDeviceMetricsOverrideParams::builder()
                .width(width)
                .height(height)
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(anyhow::Error::msg)?,
        )
        .await
        .context("Failed to set viewport")?;

        self.interceptor = Some(
            blocking::install(&page)
                .await
                .context("Failed to install request blocking")?,
        );
        self.page = Some(page);

        info!("Session {} launched", self.id);
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal session transition {} -> {}",
            self.state,
            next
        );
        trace!("Session {}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }

    fn ready_page(&self) -> ScrapeResult<Page> {
        match (&self.page, self.state) {
            (Some(page), SessionState::Ready) => Ok(page.clone()),
            _ => Err(ScrapeError::Browser(format!(
                "session {} is {}, not ready",
                self.id, self.state
            ))),
        }
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn navigate(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> ScrapeResult<NavigationOutcome> {
        let page = self.ready_page()?;
        self.transition(SessionState::Navigating);
        let result = navigate_with_fallback(&mut ChromiumLoader { page }, url, options).await;
        self.transition(SessionState::Ready);
        result
    }

    async fn content(&mut self) -> ScrapeResult<String> {
        self.ready_page()?
            .content()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Failed to read page content: {e}")))
    }

    async fn current_url(&mut self) -> Option<String> {
        let page = self.page.as_ref()?;
        match page.url().await {
            Ok(url) => url,
            Err(e) => {
                trace!("Session {}: failed to read URL: {}", self.id, e);
                None
            }
        }
    }

    async fn close(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = SessionState::Closed;

        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            debug!("Session {}: page close failed: {}", self.id, e);
        }
        if let Some(mut browser) = self.browser.take() {
            let closed = with_page_timeout(
                async { browser.close().await.map(|_| ()).map_err(Into::into) },
                CLOSE_TIMEOUT,
                "Browser close",
            )
            .await;
            if let Err(e) = closed {
                warn!("Session {}: failed to close browser cleanly: {:#}", self.id, e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Session {}: failed to wait for browser exit: {}", self.id, e);
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        // Profile removal must follow process exit
        self.profile.take();

        debug!("Session {} closed", self.id);
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        warn!("Session {} dropped without close, killing browser", self.id);
        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        // Browser::drop kills the child process
        self.browser.take();
        self.profile.take();
    }
}

/// Opens one fresh [`ChromiumSession`] per call
pub struct ChromiumSessionFactory {
    config: Arc<ScraperConfig>,
}

impl ChromiumSessionFactory {
    pub fn new(config: Arc<ScraperConfig>) -> Self {
        if let Err(e) = cleanup_stale_profiles(config.chrome_data_dir()) {
            warn!("Stale profile cleanup failed: {:#}", e);
        }
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> ScrapeResult<Box<dyn RenderSession>> {
        Ok(Box::new(ChromiumSession::launch(&self.config).await?))
    }
}
