//! URL manipulation utilities.
//!
//! Helpers for resolving extracted hrefs against a storefront base URL and
//! canonicalizing listing URLs for comparison.

use url::Url;

/// Check if a URL is an absolute http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Resolve a possibly-relative href against the storefront base URL
///
/// Returns `None` for empty hrefs, non-http schemes, and unparseable input.
#[must_use]
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let joined = base.join(href).ok()?;
    let joined = joined.to_string();
    is_valid_url(&joined).then_some(joined)
}

/// Canonical form of a listing URL: scheme, host and path only
///
/// Tracking parameters and fragments differ between two extractions of the
/// same listing, so they are dropped. Unparseable input is returned trimmed.
#[must_use]
pub fn canonicalize(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            let mut out = parsed.to_string();
            if out.ends_with('/') && parsed.path() != "/" {
                out.pop();
            }
            out
        }
        Err(_) => url.trim().to_string(),
    }
}

/// Extract the host of a URL, without a leading `www.`
#[must_use]
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Fill the `{query}` placeholder of a search URL template
#[must_use]
pub fn build_search_url(template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(query.trim());
    template.replace("{query}", &encoded)
}
