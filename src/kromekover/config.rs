use crate::browser_setup::WINDOW_SIZE;

/// Fingerprint values the evasion scripts report, kept consistent with the
/// session's user agent
#[derive(Debug, Clone)]
pub struct StealthProfile {
    pub user_agent: String,
    pub accept_language: String,
    pub platform: String,
    pub languages: Vec<String>,
    pub screen_width: u32,
    pub screen_height: u32,
    pub webgl_vendor: String,
    pub webgl_renderer: String,
    pub hardware_concurrency: u32,
    /// Per-session key for deterministic canvas noise, hex encoded
    pub canvas_seed: String,
}

impl StealthProfile {
    /// Derive `navigator.platform` and WebGL strings from the user agent
    #[must_use]
    pub fn for_user_agent(user_agent: &str) -> Self {
        let (platform, webgl_vendor, webgl_renderer) = if user_agent.contains("Macintosh") {
            ("MacIntel", "Apple Inc.", "Apple M1")
        } else if user_agent.contains("Linux") {
            ("Linux x86_64", "Intel", "Mesa Intel(R) UHD Graphics 620 (KBL GT2)")
        } else {
            ("Win32", "Google Inc. (Intel)", "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)")
        };

        Self {
            user_agent: user_agent.replace("Headless", ""),
            accept_language: "en-US,en;q=0.9".to_string(),
            platform: platform.to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            screen_width: WINDOW_SIZE.0,
            screen_height: WINDOW_SIZE.1,
            webgl_vendor: webgl_vendor.to_string(),
            webgl_renderer: webgl_renderer.to_string(),
            hardware_concurrency: 8,
            canvas_seed: hex::encode(rand::random::<[u8; 16]>()),
        }
    }
}
