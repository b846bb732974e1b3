//! Shared configuration constants for the scraping engine
//!
//! Default values and fixed tables used throughout the codebase so the
//! numbers live in one place.

use std::time::Duration;

/// Primary navigation budget: 60 seconds
///
/// Storefront search pages are client-rendered and regularly take 20-40s
/// to fire the load event behind slow tracking scripts.
pub const DEFAULT_PRIMARY_NAVIGATION_TIMEOUT_SECS: u64 = 60;

/// Budget for the permissive second navigation attempt: 30 seconds
pub const DEFAULT_FALLBACK_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// A partially loaded document shorter than this is treated as unusable
pub const DEFAULT_MIN_USABLE_DOCUMENT_BYTES: usize = 1024;

/// Ceiling for the awaiting-intervention state: 120 seconds
pub const DEFAULT_INTERVENTION_TIMEOUT_SECS: u64 = 120;

/// How often a challenged page is re-checked while awaiting intervention
pub const DEFAULT_INTERVENTION_POLL_INTERVAL_MS: u64 = 2_000;

/// Fixed delay before the single retry of an empty extraction
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3_000;

/// Maximum result elements inspected per search page
pub const DEFAULT_MAX_RESULTS_PER_SOURCE: usize = 20;

/// Maximum reviews extracted from a listing page
pub const DEFAULT_MAX_REVIEWS: usize = 5;

/// Each session costs one full Chromium process
pub const DEFAULT_MAX_CONCURRENT_SESSIONS: usize = 4;

/// Wall-clock budget for one source call inside a fan-out
///
/// Must exceed primary + fallback navigation + intervention ceiling + retry.
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 300;

/// Extra time the orchestrator allows past a source's budget so an adapter
/// that hit its own deadline can still close its session
pub const SESSION_CLOSE_GRACE: Duration = Duration::from_secs(15);

pub const DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_CIRCUIT_BREAKER_RETRY_DELAY_SECS: u64 = 300;

/// Amounts above this many units are assumed to be a missing decimal point
pub const PRICE_SANITY_CEILING_UNITS: i64 = 1_000_000;

/// Query and title tokens shorter than this are ignored by the relevance filter
pub const MIN_TOKEN_LEN: usize = 3;

/// Queries with at least this many significant tokens need two overlapping tokens
pub const LONG_QUERY_TOKENS: usize = 4;

/// Chrome user agents rotated per session
///
/// Updated: 2026-09 to Chrome 140 stable across the three desktop platforms.
/// Keep all entries within a few major versions of each other.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.7339.128 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.7258.155 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.7339.133 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.7258.139 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.7339.127 Safari/537.36",
];

/// Brand keywords shared by every source; rulesets extend this list
pub const DEFAULT_BRAND_KEYWORDS: &[&str] = &[
    "apple", "samsung", "dell", "hp", "lenovo", "asus", "acer", "msi", "sony", "lg",
    "xiaomi", "redmi", "oneplus", "realme", "oppo", "vivo", "motorola", "nokia", "google",
    "microsoft", "logitech", "boat", "jbl", "bose", "sennheiser", "canon", "nikon",
    "philips", "panasonic", "intel", "amd", "nvidia", "nike", "adidas", "puma",
];

/// Words that carry no relevance signal in a product query
pub const QUERY_STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "new", "best", "buy", "cheap", "online", "price",
    "sale", "deal", "deals", "offer", "latest", "original", "genuine",
];

/// Phrases that identify an anti-bot interstitial
pub const CHALLENGE_PHRASES: &[&str] = &[
    "captcha",
    "robot check",
    "verify you are a human",
    "verify you are human",
    "unusual traffic",
    "are you a robot",
    "enter the characters you see below",
    "press & hold",
    "please confirm you are not a robot",
];

/// Resource hosts that are blocked on every page
pub const BLOCKED_TRACKER_HOSTS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "facebook.net",
    "connect.facebook.net",
    "amazon-adsystem.com",
    "scorecardresearch.com",
    "criteo.com",
    "hotjar.com",
];
