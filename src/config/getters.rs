//! Getter methods for `ScrapeConfig`
//!
//! Timeouts are stored as plain integers for serde and handed out as
//! `Duration`s.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::ScrapeConfig;

impl ScrapeConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&PathBuf> {
        self.chrome_executable.as_ref()
    }

    #[must_use]
    pub fn user_data_dir(&self) -> Option<&PathBuf> {
        self.user_data_dir.as_ref()
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    #[must_use]
    pub fn scroll_timeout(&self) -> Duration {
        Duration::from_secs(self.scroll_timeout_secs)
    }

    #[must_use]
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    #[must_use]
    pub fn overlay_timeout(&self) -> Duration {
        Duration::from_secs(self.overlay_timeout_secs)
    }

    #[must_use]
    pub fn post_click_wait(&self) -> Duration {
        Duration::from_millis(self.post_click_wait_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn max_scroll_iterations(&self) -> u32 {
        self.max_scroll_iterations
    }

    #[must_use]
    pub fn preload_scroll_steps(&self) -> u32 {
        self.preload_scroll_steps
    }

    #[must_use]
    pub fn min_root_text_len(&self) -> usize {
        self.min_root_text_len
    }

    #[must_use]
    pub fn list_lookup_attempts(&self) -> u32 {
        self.list_lookup_attempts
    }

    /// Absolute URL of a platform path such as `/me/lists`.
    #[must_use]
    pub fn platform_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
