//! Capability interface over a live page
//!
//! Navigation, extraction and list automation only talk to the browser
//! through [`PageDriver`]. The chromiumoxide implementation lives in
//! [`super::chromium`]; tests drive the same code with a scripted fake.
//!
//! Elements are never handed across the boundary. A successful
//! [`PageDriver::locate`] tags the element inside the page and returns its key
//! plus its viewport center, and later locators refer back to that key.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Viewport coordinates in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An element found by [`PageDriver::locate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Located {
    /// Page-side reference usable in follow-up locators
    pub key: String,
    /// Center of the bounding box; `None` when the element has no layout box
    #[serde(default)]
    pub center: Option<Point>,
    /// Trimmed visible text, capped for diagnostics
    #[serde(default)]
    pub text: String,
    /// Checked or pressed state, reported for list picker rows only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

/// What to look for in the live DOM
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Readiness signal: a story heading or primary content container
    ContentPresent,
    /// An anchor whose normalized path equals `path`
    Anchor { path: String },
    /// The smallest independent item card enclosing the anchor `anchor`
    Card { anchor: String },
    /// A control inside `card` whose accessible label contains a keyword
    Control { card: String, keywords: Vec<String> },
    /// A visible overlay panel (dialog, menu or popover)
    Overlay,
    /// A row inside `overlay` whose text contains `label`
    PickerRow { overlay: String, label: String },
}

impl Locator {
    /// Short name for logs and failure reasons.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ContentPresent => "content-present".to_string(),
            Self::Anchor { path } => format!("anchor[{path}]"),
            Self::Card { anchor } => format!("card-of[{anchor}]"),
            Self::Control { card, keywords } => {
                format!("control-in[{card}]({})", keywords.join("|"))
            }
            Self::Overlay => "overlay".to_string(),
            Self::PickerRow { overlay, label } => format!("row-in[{overlay}]({label})"),
        }
    }
}

/// Outcome of a top-level navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// HTTP status of the main document, when the engine reported one
    pub status: Option<u16>,
    /// URL after redirects
    pub final_url: String,
}

/// A cookie to install before the first navigation
#[derive(Debug, Clone, PartialEq)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Seconds since the epoch; `None` for session cookies
    pub expires: Option<f64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<String>,
}

/// Browser capabilities the core needs from a page
///
/// Implementations must not run two operations concurrently against the
/// same page; callers serialize access.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url` as a top-level navigation.
    async fn navigate(&self, url: &str) -> Result<Navigation>;

    async fn current_url(&self) -> Result<String>;

    /// Serialized HTML of the current document.
    async fn html(&self) -> Result<String>;

    async fn scroll_height(&self) -> Result<f64>;

    async fn viewport_height(&self) -> Result<f64>;

    /// Scroll the window to vertical offset `y`.
    async fn scroll_to(&self, y: f64) -> Result<()>;

    /// Find one element, `Ok(None)` when nothing matches right now.
    async fn locate(&self, locator: &Locator) -> Result<Option<Located>>;

    /// Center `element` in the viewport, returning its refreshed center.
    async fn scroll_into_view(&self, element: &Located) -> Result<Option<Point>>;

    /// Dispatch a real mouse click at `point`.
    async fn click(&self, point: Point) -> Result<()>;

    /// Send an Escape key press to the focused document.
    async fn press_escape(&self) -> Result<()>;

    async fn install_cookies(&self, cookies: &[CookieSpec]) -> Result<()>;
}

/// Poll `locator` until it matches or `timeout` elapses.
///
/// Locate errors during polling are treated as "not yet"; the page may be
/// mid-navigation.
pub async fn wait_for<D>(
    driver: &D,
    locator: &Locator,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<Located>>
where
    D: PageDriver + ?Sized,
{
    let start = Instant::now();
    loop {
        match driver.locate(locator).await {
            Ok(Some(found)) => {
                trace!(
                    locator = %locator.describe(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "locator matched"
                );
                return Ok(Some(found));
            }
            Ok(None) => {}
            Err(e) => trace!("locate {} failed while polling: {e:#}", locator.describe()),
        }

        if start.elapsed() >= timeout {
            return Ok(None);
        }
        tokio::time::sleep(poll_interval).await;
    }
}
