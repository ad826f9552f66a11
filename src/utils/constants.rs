//! Shared configuration constants for mediumscrape
//!
//! Default values used throughout the codebase so timeouts and limits are
//! defined in exactly one place.

/// Platform origin every relative link is resolved against.
pub const DEFAULT_BASE_URL: &str = "https://medium.com";

/// Display name of the list that is reachable through a fixed path.
pub const DEFAULT_LIST_LABEL: &str = "Reading list";

/// Path of the default reading list, relative to [`DEFAULT_BASE_URL`].
pub const READING_LIST_PATH: &str = "/me/list/reading-list";

/// Path of the page enumerating every list owned by the account.
pub const LISTS_INDEX_PATH: &str = "/me/lists";

/// Default location of the persisted storage-state blob.
pub const DEFAULT_SESSION_FILE: &str = "medium-session.json";

/// Timeout for `page.goto()` plus the navigation response.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Timeout for the "content present" readiness signal.
///
/// Lazy widgets on article pages never reach network idle, so this bounds a
/// selector poll rather than a load event.
pub const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 10;

/// Upper bound for one scroll-settle wait.
pub const DEFAULT_SCROLL_TIMEOUT_SECS: u64 = 15;

/// Delay after each scroll before the document height is measured.
pub const DEFAULT_SCROLL_SETTLE_MS: u64 = 1_200;

/// Timeout for the list picker overlay to appear after clicking a control.
pub const DEFAULT_OVERLAY_TIMEOUT_SECS: u64 = 5;

/// Render wait after a click that changes membership state.
pub const DEFAULT_POST_CLICK_WAIT_MS: u64 = 800;

/// Poll interval for every selector-based wait.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Hard cap on scroll iterations for infinite lists.
pub const DEFAULT_MAX_SCROLL_ITERATIONS: u32 = 50;

/// Number of viewport-sized steps taken when preloading an article.
pub const DEFAULT_PRELOAD_SCROLL_STEPS: u32 = 5;

/// Pause between preload scroll steps, letting lazy images request.
pub const PRELOAD_STEP_DELAY_MS: u64 = 500;

/// Minimum visible text length for a content root to count as non-trivial.
pub const DEFAULT_MIN_ROOT_TEXT_LEN: usize = 200;

/// Number of times the lists index is reloaded while looking for a label.
pub const DEFAULT_LIST_LOOKUP_ATTEMPTS: u32 = 3;

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
