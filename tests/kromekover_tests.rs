//! Live-browser checks; need a local Chrome/Chromium (or network access to fetch one)
//!
//! Run with `cargo test -- --ignored`.

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use pricewatch_scraper::browser_setup::{LaunchOptions, launch_browser};
use pricewatch_scraper::config::ScraperConfig;
use pricewatch_scraper::kromekover::{StealthProfile, inject};
use pricewatch_scraper::session::{ChromiumSessionFactory, NavigateOptions, SessionFactory, SessionState};
use pricewatch_scraper::utils::USER_AGENTS;

#[tokio::test]
#[ignore = "requires a Chromium installation"]
async fn test_evasions() -> Result<()> {
    let profile_dir = TempDir::new()?;
    let user_agent = USER_AGENTS[0];
    let (mut browser, handler) = launch_browser(&LaunchOptions {
        headless: true,
        user_data_dir: profile_dir.path(),
        user_agent,
    })
    .await?;

    let page = browser.new_page("about:blank").await?;
    inject(&page, &StealthProfile::for_user_agent(user_agent)).await?;
    page.goto("data:text/html,<html><body></body></html>").await?;

    let webdriver: Option<bool> = page.evaluate("navigator.webdriver").await?.into_value().ok();
    assert_ne!(webdriver, Some(true));

    let vendor: String = page.evaluate("navigator.vendor").await?.into_value()?;
    assert_eq!(vendor, "Google Inc.");

    let ua: String = page.evaluate("navigator.userAgent").await?.into_value()?;
    assert!(!ua.contains("Headless"), "{ua}");

    let has_runtime: bool = page.evaluate("!!(window.chrome && window.chrome.runtime)").await?.into_value()?;
    assert!(has_runtime);

    browser.close().await?;
    handler.abort();
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chromium installation"]
async fn test_session_lifecycle() -> Result<()> {
    let profiles = TempDir::new()?;
    let config = ScraperConfig::builder()
        .chrome_data_dir(Some(profiles.path()))
        .build()?;
    let options = NavigateOptions::from_config(&config);
    let factory = ChromiumSessionFactory::new(Arc::new(config));

    let mut session = factory.open().await?;
    assert_eq!(session.state(), SessionState::Ready);

    session
        .navigate("data:text/html,<html><body><h1>pricewatch</h1></body></html>", &options)
        .await?;
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.content().await?.contains("pricewatch"));

    session.close().await;
    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);
    Ok(())
}
