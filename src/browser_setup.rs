//! Chromium discovery and launch
//!
//! Finds a local Chrome/Chromium (or downloads a managed one) and launches it
//! with the automation-hiding flags every scraping session needs.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

/// Window and viewport size used for every session
pub const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Flags that strip the most obvious automation signals and background noise
const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-print-preview",
    "--disable-software-rasterizer",
    "--disable-setuid-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-component-extensions-with-background-pages",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-prompt-on-repost",
    "--metrics-recording-only",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
    "--lang=en-US",
];

/// Parameters for one browser process
#[derive(Debug, Clone)]
pub struct LaunchOptions<'a> {
    pub headless: bool,
    pub user_data_dir: &'a Path,
    pub user_agent: &'a str,
}

fn candidate_paths() -> Vec<PathBuf> {
    let raw: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"%PROGRAMFILES%\Google\Chrome\Application\chrome.exe",
            r"%PROGRAMFILES(X86)%\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    raw.iter()
        .filter_map(|p| {
            if let Some(rest) = p.strip_prefix("~/") {
                dirs::home_dir().map(|home| home.join(rest))
            } else if p.contains('%') {
                Some(PathBuf::from(expand_env_tokens(p)))
            } else {
                Some(PathBuf::from(p))
            }
        })
        .collect()
}

/// Replace `%VAR%` tokens with environment values, leaving unknown tokens intact
fn expand_env_tokens(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) if !name.is_empty() => out.push_str(&value),
                    _ => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Find a Chrome/Chromium executable: `CHROMIUM_PATH`, well-known install
/// locations, then `which`.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!("CHROMIUM_PATH points to non-existent file: {}", path.display());
    }

    if let Some(path) = candidate_paths().into_iter().find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which {}': {}", cmd, found);
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found, falling back to managed download");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine user cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("pricewatch")
        .join("chromium");

    info!("Downloading managed Chromium into {}", cache_dir.display());
    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// CDP handler errors caused by events chromiumoxide cannot deserialize
///
/// See mattsse/chromiumoxide#167 and #229.
pub(crate) fn is_benign_handler_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Launch a browser process and spawn its CDP handler task
///
/// The returned handle must be aborted once the browser is closed.
pub async fn launch_browser(options: &LaunchOptions<'_>) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let (width, height) = WINDOW_SIZE;
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(width, height)
        .user_data_dir(options.user_data_dir)
        .chrome_executable(chrome_path)
        .arg(format!("--user-agent={}", options.user_agent));

    builder = if options.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    for arg in STEALTH_ARGS {
        builder = builder.arg(*arg);
    }

    let config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    debug!("Launching browser with profile {}", options.user_data_dir.display());
    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_handler_error(&message) {
                    trace!("Suppressed benign CDP serialization error: {}", message);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        debug!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}
