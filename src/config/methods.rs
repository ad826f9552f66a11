//! Fluent setters and environment loading for `ScrapeConfig`

use std::path::PathBuf;

use super::types::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};

impl ScrapeConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_user_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    #[must_use]
    pub fn with_navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_readiness_timeout_secs(mut self, secs: u64) -> Self {
        self.readiness_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_scroll_timeout_secs(mut self, secs: u64) -> Self {
        self.scroll_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_scroll_settle_ms(mut self, ms: u64) -> Self {
        self.scroll_settle_ms = ms;
        self
    }

    #[must_use]
    pub fn with_overlay_timeout_secs(mut self, secs: u64) -> Self {
        self.overlay_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_post_click_wait_ms(mut self, ms: u64) -> Self {
        self.post_click_wait_ms = ms;
        self
    }

    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    #[must_use]
    pub fn with_max_scroll_iterations(mut self, max: u32) -> Self {
        self.max_scroll_iterations = max.max(1);
        self
    }

    #[must_use]
    pub fn with_preload_scroll_steps(mut self, steps: u32) -> Self {
        self.preload_scroll_steps = steps;
        self
    }

    #[must_use]
    pub fn with_min_root_text_len(mut self, len: usize) -> Self {
        self.min_root_text_len = len;
        self
    }

    #[must_use]
    pub fn with_list_lookup_attempts(mut self, attempts: u32) -> Self {
        self.list_lookup_attempts = attempts.max(1);
        self
    }

    /// Overlay environment variables onto the defaults.
    ///
    /// Recognised variables: `MEDIUM_SESSION_PATH`, `HEADLESS`, `LOG_LEVEL`,
    /// `CHROMIUM_PATH`, `MEDIUM_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] when a variable holds an invalid value.
    pub fn from_env() -> ScrapeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] when a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> ScrapeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("MEDIUM_SESSION_PATH").filter(|v| !v.trim().is_empty()) {
            config.session_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("HEADLESS") {
            config.headless = parse_bool("HEADLESS", &raw)?;
        }

        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            let level = level.trim().to_ascii_lowercase();
            if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                return Err(ScrapeError::Config(format!(
                    "LOG_LEVEL must be one of trace/debug/info/warn/error, got '{level}'"
                )));
            }
            config.log_level = level;
        }

        if let Some(path) = lookup("CHROMIUM_PATH").filter(|v| !v.trim().is_empty()) {
            config.chrome_executable = Some(PathBuf::from(path));
        }

        if let Some(base) = lookup("MEDIUM_BASE_URL").filter(|v| !v.trim().is_empty()) {
            if !crate::utils::is_valid_url(&base) {
                return Err(ScrapeError::Config(format!(
                    "MEDIUM_BASE_URL is not an http(s) URL: '{base}'"
                )));
            }
            config.base_url = base;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> ScrapeResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ScrapeError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
