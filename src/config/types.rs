//! Core configuration type for navigation, extraction and automation
//!
//! Every wait in the crate belongs to one timeout class and reads its bound
//! from here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::constants::*;

/// Main configuration struct for a scraping run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Origin used to resolve relative links and the fixed list paths.
    pub(crate) base_url: String,

    /// Persisted storage-state blob holding the authenticated cookies.
    pub(crate) session_path: PathBuf,

    pub(crate) headless: bool,

    /// Chrome/Chromium executable override. When `None` the platform search
    /// in [`crate::browser::find_browser_executable`] runs.
    pub(crate) chrome_executable: Option<PathBuf>,

    /// Chrome profile directory. Defaults to a per-process temp directory.
    pub(crate) user_data_dir: Option<PathBuf>,

    pub(crate) log_level: String,

    /// Timeout in seconds for `page.goto()` and the navigation response
    ///
    /// Default: 30 seconds
    pub(crate) navigation_timeout_secs: u64,

    /// Timeout in seconds for the "content present" readiness poll
    ///
    /// On expiry classification proceeds with whatever DOM is present.
    ///
    /// Default: 10 seconds
    pub(crate) readiness_timeout_secs: u64,

    /// Upper bound in seconds for one scroll-and-settle pass
    ///
    /// Default: 15 seconds
    pub(crate) scroll_timeout_secs: u64,

    /// Delay between a scroll and the next height measurement
    pub(crate) scroll_settle_ms: u64,

    /// Timeout in seconds for the list picker overlay
    ///
    /// Default: 5 seconds
    pub(crate) overlay_timeout_secs: u64,

    pub(crate) post_click_wait_ms: u64,
    pub(crate) poll_interval_ms: u64,

    /// Iteration cap for the exhaustive scroll loop
    ///
    /// Default: 50
    pub(crate) max_scroll_iterations: u32,

    pub(crate) preload_scroll_steps: u32,

    /// Minimum visible text length for a content root candidate
    pub(crate) min_root_text_len: usize,

    /// Reloads of the lists index while searching for a label
    pub(crate) list_lookup_attempts: u32,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_path: PathBuf::from(DEFAULT_SESSION_FILE),
            headless: true,
            chrome_executable: None,
            user_data_dir: None,
            log_level: "info".to_string(),
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            readiness_timeout_secs: DEFAULT_READINESS_TIMEOUT_SECS,
            scroll_timeout_secs: DEFAULT_SCROLL_TIMEOUT_SECS,
            scroll_settle_ms: DEFAULT_SCROLL_SETTLE_MS,
            overlay_timeout_secs: DEFAULT_OVERLAY_TIMEOUT_SECS,
            post_click_wait_ms: DEFAULT_POST_CLICK_WAIT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_scroll_iterations: DEFAULT_MAX_SCROLL_ITERATIONS,
            preload_scroll_steps: DEFAULT_PRELOAD_SCROLL_STEPS,
            min_root_text_len: DEFAULT_MIN_ROOT_TEXT_LEN,
            list_lookup_attempts: DEFAULT_LIST_LOOKUP_ATTEMPTS,
        }
    }
}
