use serde::{Deserialize, Serialize};

/// Fingerprint values presented to the page
///
/// Kept consistent with the Windows Chrome user agent in
/// [`crate::utils::constants::CHROME_USER_AGENT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StealthProfile {
    pub accept_language: String,
    pub platform: String,
    pub languages: Vec<String>,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for StealthProfile {
    fn default() -> Self {
        Self {
            accept_language: "en-US,en;q=0.9".to_string(),
            platform: "Win32".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

impl StealthProfile {
    /// Init script aligning `navigator.languages` and `navigator.platform`
    /// with the HTTP-level overrides.
    #[must_use]
    pub fn navigator_script(&self) -> String {
        let languages =
            serde_json::to_string(&self.languages).unwrap_or_else(|_| "[]".to_string());
        let platform =
            serde_json::to_string(&self.platform).unwrap_or_else(|_| "\"Win32\"".to_string());
        format!(
            r"
            Object.defineProperty(Navigator.prototype, 'languages', {{
                get: () => {languages},
                configurable: true
            }});
            Object.defineProperty(Navigator.prototype, 'platform', {{
                get: () => {platform},
                configurable: true
            }});
            "
        )
    }
}
