//! Stealth script injection for rendering sessions

use anyhow::Result;
use chromiumoxide::{Page, cdp};
use tracing::{debug, warn};

mod config;
mod scripts;

pub use config::StealthProfile;

// Registered one at a time in this order, which is the order Chromium runs
// them on each new document: artifact removal and navigator patches first.
const EVASION_SCRIPTS: &[(&str, &str)] = &[
    ("navigator_webdriver", scripts::NAVIGATOR_WEBDRIVER),
    ("cdp_artifacts", scripts::CDP_ARTIFACTS),
    ("navigator_identity", scripts::NAVIGATOR_IDENTITY),
    ("navigator_plugins", scripts::NAVIGATOR_PLUGINS),
    ("navigator_permissions", scripts::NAVIGATOR_PERMISSIONS),
    ("chrome_runtime", scripts::CHROME_RUNTIME),
    ("webgl_vendor", scripts::WEBGL_VENDOR),
    ("screen_metrics", scripts::SCREEN_METRICS),
    ("canvas_noise", scripts::CANVAS_NOISE),
];

fn add_script(source: String) -> cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
    cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
        source,
        include_command_line_api: None,
        world_name: None,
        run_immediately: None,
    }
}

/// Script that publishes the profile as `window.__stealthConfig`
pub(crate) fn config_script(profile: &StealthProfile) -> String {
    let config = serde_json::json!({
        "platform": profile.platform,
        "languages": profile.languages,
        "screenWidth": profile.screen_width,
        "screenHeight": profile.screen_height,
        "webglVendor": profile.webgl_vendor,
        "webglRenderer": profile.webgl_renderer,
        "hardwareConcurrency": profile.hardware_concurrency,
        "canvasSeed": profile.canvas_seed,
    });
    format!(
        "Object.defineProperty(window, '__stealthConfig', {{ value: Object.freeze({config}), enumerable: false }});"
    )
}

/// Install the evasion scripts and the user agent override on `page`
///
/// Individual script failures are logged; the call only fails if no script
/// could be installed at all.
pub async fn inject(page: &Page, profile: &StealthProfile) -> Result<()> {
    debug!("Injecting stealth configuration");
    page.execute(add_script(config_script(profile))).await?;

    let mut failed = Vec::new();
    for (name, source) in EVASION_SCRIPTS {
        if let Err(e) = page.execute(add_script((*source).to_string())).await {
            warn!("Failed to inject {}: {}", name, e);
            failed.push(*name);
        }
    }

    if failed.len() == EVASION_SCRIPTS.len() {
        return Err(anyhow::anyhow!("Failed to inject any stealth scripts"));
    }

    page.execute(cdp::browser_protocol::network::SetUserAgentOverrideParams {
        user_agent: profile.user_agent.clone(),
        accept_language: Some(profile.accept_language.clone()),
        platform: Some(profile.platform.clone()),
        user_agent_metadata: None,
    })
    .await?;

    debug!(
        "Stealth injection complete: {}/{} scripts active",
        EVASION_SCRIPTS.len() - failed.len(),
        EVASION_SCRIPTS.len()
    );
    Ok(())
}
