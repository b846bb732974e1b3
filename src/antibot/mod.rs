//! Anti-bot challenge detection and the bounded intervention wait
//!
//! Detection is a plain phrase match over the visible text of a page (plus a
//! few URL markers for interstitials that redirect). Challenges are never
//! solved here; a challenged page either clears within the wait or is blocked.

pub mod intervention;

use ego_tree::iter::Edge;
use scraper::{Html, Node};

use crate::utils::constants::CHALLENGE_PHRASES;

pub use intervention::{ChallengeOutcome, InterventionPolicy, await_intervention};

/// Path fragments of interstitial pages some storefronts redirect to
const CHALLENGE_URL_MARKERS: &[&str] = &["/captcha", "validatecaptcha", "/sorry/", "/blocked"];

/// Elements whose text never reaches the user
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Case-insensitive match of `page_text` against the built-in phrase set
#[must_use]
pub fn detect_challenge(page_text: &str) -> bool {
    let haystack = page_text.to_lowercase();
    CHALLENGE_PHRASES.iter().any(|phrase| haystack.contains(phrase))
}

/// Title and body text of an HTML document, script and style content excluded
#[must_use]
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    let mut hidden_depth = 0usize;

    for edge in document.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(el) if INVISIBLE_ELEMENTS.contains(&el.name()) => hidden_depth += 1,
                Node::Text(text) if hidden_depth == 0 => {
                    let text = text.trim();
                    if !text.is_empty() {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(text);
                    }
                }
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(el) = node.value()
                    && INVISIBLE_ELEMENTS.contains(&el.name())
                {
                    hidden_depth -= 1;
                }
            }
        }
    }
    out
}

/// Phrase matcher for one source: the built-in phrases plus the site's own markers
#[derive(Debug, Clone)]
pub struct ChallengeDetector {
    phrases: Vec<String>,
}

impl Default for ChallengeDetector {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ChallengeDetector {
    pub fn new(site_markers: &[String]) -> Self {
        let phrases = CHALLENGE_PHRASES
            .iter()
            .map(|p| (*p).to_string())
            .chain(
                site_markers
                    .iter()
                    .map(|m| m.trim().to_lowercase())
                    .filter(|m| !m.is_empty()),
            )
            .collect();
        Self { phrases }
    }

    #[must_use]
    pub fn is_challenge_text(&self, page_text: &str) -> bool {
        let haystack = page_text.to_lowercase();
        self.phrases.iter().any(|phrase| haystack.contains(phrase.as_str()))
    }

    /// Check a rendered document and, when known, the URL it ended up on
    #[must_use]
    pub fn is_challenge_page(&self, html: &str, url: Option<&str>) -> bool {
        if let Some(url) = url {
            let url = url.to_lowercase();
            if CHALLENGE_URL_MARKERS.iter().any(|m| url.contains(m)) {
                return true;
            }
        }
        self.is_challenge_text(&visible_text(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_match_case_insensitively() {
        assert!(detect_challenge("Please complete the CAPTCHA to continue"));
        assert!(detect_challenge("Robot Check"));
        assert!(detect_challenge("Our systems have detected Unusual Traffic from your network"));
        assert!(!detect_challenge("Dell XPS 13 Laptop, 16GB RAM"));
    }

    #[test]
    fn script_content_is_not_visible() {
        let html = r#"<html><head><title>Results</title>
            <script>window.captchaConfig = {};</script><style>.captcha{}</style></head>
            <body><div>Dell XPS 13</div><noscript>enable js</noscript></body></html>"#;
        let text = visible_text(html);
        assert!(text.contains("Results"));
        assert!(text.contains("Dell XPS 13"));
        assert!(!text.contains("captchaConfig"));
        assert!(!text.contains("enable js"));
        assert!(!ChallengeDetector::default().is_challenge_page(html, None));
    }

    #[test]
    fn site_markers_extend_builtin_phrases() {
        let detector = ChallengeDetector::new(&["Pardon Our Interruption".to_string()]);
        let html = "<html><body><h1>Pardon our interruption...</h1></body></html>";
        assert!(detector.is_challenge_page(html, None));
        assert!(!ChallengeDetector::default().is_challenge_page(html, None));
    }

    #[test]
    fn challenge_url_is_detected() {
        let detector = ChallengeDetector::default();
        let html = "<html><body>Loading</body></html>";
        assert!(detector.is_challenge_page(html, Some("https://www.amazon.in/errors/validateCaptcha")));
        assert!(!detector.is_challenge_page(html, Some("https://www.amazon.in/s?k=laptop")));
    }
}
