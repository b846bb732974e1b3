//! Built-in storefront rulesets and the rules directory override

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ProductSource, SiteAdapter};
use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::extraction::SiteRuleset;
use crate::session::SessionFactory;

/// Rulesets compiled into the binary, in registration order
const BUILTIN_RULESETS: &[(&str, &str)] = &[
    ("amazon", include_str!("../../rules/amazon.json")),
    ("flipkart", include_str!("../../rules/flipkart.json")),
    ("ebay", include_str!("../../rules/ebay.json")),
    ("walmart", include_str!("../../rules/walmart.json")),
];

/// Parse the embedded rulesets
pub fn builtin_rulesets() -> ScrapeResult<Vec<SiteRuleset>> {
    BUILTIN_RULESETS
        .iter()
        .map(|(name, json)| {
            SiteRuleset::from_json(json).map_err(|e| {
                ScrapeError::Config(format!("Built-in ruleset '{name}' is malformed: {e}"))
            })
        })
        .collect()
}

/// Parse every `*.json` file in `dir`, in file name order
pub fn load_rules_dir(dir: &Path) -> ScrapeResult<Vec<SiteRuleset>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ScrapeError::Config(format!("Failed to read rules directory {}: {e}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let raw = std::fs::read_to_string(path)?;
            let ruleset = SiteRuleset::from_json(&raw).map_err(|e| {
                ScrapeError::Config(format!("Failed to parse ruleset {}: {e}", path.display()))
            })?;
            debug!("Loaded ruleset '{}' from {}", ruleset.id, path.display());
            Ok(ruleset)
        })
        .collect()
}

/// Built-ins overlaid with the rules directory, narrowed to the configured sources
///
/// A directory ruleset replaces the built-in with the same id or registers a
/// new source after the built-ins. When `sources` is configured the result
/// follows its order.
///
/// # Errors
/// `ScrapeError::AdapterNotFound` for a configured source no ruleset defines.
pub fn resolve_rulesets(config: &ScraperConfig) -> ScrapeResult<Vec<SiteRuleset>> {
    let mut rulesets = builtin_rulesets()?;

    if let Some(dir) = config.rules_dir() {
        for ruleset in load_rules_dir(dir)? {
            match rulesets.iter_mut().find(|existing| existing.id == ruleset.id) {
                Some(existing) => {
                    info!("Ruleset '{}' overridden from {}", ruleset.id, dir.display());
                    *existing = ruleset;
                }
                None => {
                    info!("Ruleset '{}' added from {}", ruleset.id, dir.display());
                    rulesets.push(ruleset);
                }
            }
        }
    }

    let Some(wanted) = config.sources() else {
        return Ok(rulesets);
    };
    wanted
        .iter()
        .map(|id| {
            rulesets
                .iter()
                .find(|ruleset| &ruleset.id == id)
                .cloned()
                .ok_or_else(|| ScrapeError::AdapterNotFound(id.clone()))
        })
        .collect()
}

/// One compiled adapter per resolved ruleset, all sharing `sessions`
pub fn build_adapters(
    config: &ScraperConfig,
    sessions: Arc<dyn SessionFactory>,
) -> ScrapeResult<Vec<Arc<dyn ProductSource>>> {
    resolve_rulesets(config)?
        .iter()
        .map(|ruleset| {
            let adapter = SiteAdapter::new(ruleset, Arc::clone(&sessions), config)?;
            Ok(Arc::new(adapter) as Arc<dyn ProductSource>)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_parse_in_registration_order() {
        let ids: Vec<String> = builtin_rulesets()
            .expect("builtins parse")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["amazon", "flipkart", "ebay", "walmart"]);
    }

    #[test]
    fn builtins_compile() {
        for ruleset in builtin_rulesets().expect("builtins parse") {
            ruleset
                .compile()
                .unwrap_or_else(|e| panic!("{} failed to compile: {e}", ruleset.id));
        }
    }

    #[test]
    fn configured_sources_narrow_and_order() {
        let config = ScraperConfig::builder()
            .sources(Some(vec!["walmart".into(), "amazon".into()]))
            .build()
            .expect("valid config");
        let ids: Vec<String> = resolve_rulesets(&config)
            .expect("resolves")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["walmart", "amazon"]);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let config = ScraperConfig::builder()
            .sources(Some(vec!["bestbuy".into()]))
            .build()
            .expect("valid config");
        assert!(matches!(
            resolve_rulesets(&config),
            Err(ScrapeError::AdapterNotFound(id)) if id == "bestbuy"
        ));
    }
}
