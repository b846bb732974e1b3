//! Request blocking for rendering sessions
//!
//! Heavy resources (images, media, fonts, beacons) and known tracker hosts
//! are failed with `BlockedByClient` through the CDP Fetch domain; every
//! other request is continued untouched.

use anyhow::Result;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
    RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::utils::constants::BLOCKED_TRACKER_HOSTS;
use crate::utils::extract_domain;

#[must_use]
pub fn is_heavy_resource(kind: &ResourceType) -> bool {
    matches!(
        kind,
        ResourceType::Image | ResourceType::Media | ResourceType::Font | ResourceType::Ping
    )
}

/// Whether `url` is served by a blocked tracker host or one of its subdomains
#[must_use]
pub fn is_tracker(url: &str) -> bool {
    let Some(host) = extract_domain(url) else {
        return false;
    };
    BLOCKED_TRACKER_HOSTS
        .iter()
        .any(|blocked| host == *blocked || host.ends_with(&format!(".{blocked}")))
}

#[must_use]
pub fn should_block(kind: &ResourceType, url: &str) -> bool {
    is_heavy_resource(kind) || is_tracker(url)
}

/// Start intercepting requests on `page`
///
/// The listener is registered before interception is enabled so no paused
/// request is missed. Abort the returned task when the session closes.
pub async fn install(page: &Page) -> Result<JoinHandle<()>> {
    let mut paused = page.event_listener::<EventRequestPaused>().await?;
    let intercept_page = page.clone();

    let task = tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request_id = event.request_id.clone();
            let outcome = if should_block(&event.resource_type, &event.request.url) {
                trace!("Blocking {:?} {}", event.resource_type, event.request.url);
                intercept_page
                    .execute(FailRequestParams::new(request_id, ErrorReason::BlockedByClient))
                    .await
                    .map(|_| ())
            } else {
                intercept_page
                    .execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ())
            };
            if let Err(e) = outcome {
                // Requests of a page that is being torn down fail routinely
                trace!("Failed to resolve paused request: {}", e);
            }
        }
    });

    let pattern = RequestPattern::builder()
        .url_pattern("*")
        .request_stage(RequestStage::Request)
        .build();
    if let Err(e) = page.execute(EnableParams::builder().pattern(pattern).build()).await {
        task.abort();
        return Err(e.into());
    }

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavy_types_are_blocked() {
        for kind in [ResourceType::Image, ResourceType::Media, ResourceType::Font, ResourceType::Ping] {
            assert!(should_block(&kind, "https://shop.test/a"));
        }
        assert!(!should_block(&ResourceType::Document, "https://shop.test/"));
        assert!(!should_block(&ResourceType::Script, "https://shop.test/app.js"));
        assert!(!should_block(&ResourceType::Xhr, "https://shop.test/api/search"));
    }

    #[test]
    fn tracker_hosts_and_subdomains_are_blocked() {
        assert!(should_block(&ResourceType::Script, "https://www.googletagmanager.com/gtm.js"));
        assert!(should_block(&ResourceType::Xhr, "https://stats.g.doubleclick.net/collect"));
        assert!(!should_block(&ResourceType::Script, "https://notdoubleclick.net/x.js"));
        assert!(!is_tracker("not a url"));
    }
}
