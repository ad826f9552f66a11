//! Shared fixtures for the mediumscrape integration tests
//!
//! [`FakeDriver`] scripts a page: responses per URL, a sequence of document
//! heights, and elements that become locatable up front or only after a
//! click. Every interaction is recorded for assertions.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mediumscrape::browser::{CookieSpec, Located, Locator, Navigation, PageDriver, Point};
use mediumscrape::session::{SessionState, StoredCookie};
use mediumscrape::ScrapeConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const STORY_URL: &str = "https://medium.com/@alice/rust-ownership-1a2b3c4d5e6f";

/// Scripted response for one URL
#[derive(Debug, Clone)]
pub struct FakePage {
    pub status: Option<u16>,
    pub final_url: Option<String>,
    /// URL reported after load, for client-side redirects
    pub settled_url: Option<String>,
    pub html: String,
    /// Whether the content-present readiness signal ever matches
    pub ready: bool,
}

impl FakePage {
    pub fn ok(html: impl Into<String>) -> Self {
        Self {
            status: Some(200),
            final_url: None,
            settled_url: None,
            html: html.into(),
            ready: true,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            status: Some(code),
            ..Self::ok("<html><body>error</body></html>")
        }
    }

    pub fn redirected_to(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = Some(final_url.into());
        self
    }

    pub fn settles_at(mut self, url: impl Into<String>) -> Self {
        self.settled_url = Some(url.into());
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.ready = false;
        self
    }
}

#[derive(Default)]
struct FakeState {
    /// Responses per URL, consumed in order; the last one repeats
    pages: HashMap<String, VecDeque<FakePage>>,
    current: Option<(String, FakePage)>,
    heights: VecDeque<f64>,
    elements: HashMap<Locator, Located>,
    /// Revealed by the first click at the given point
    on_click: Vec<(Point, Locator, Located)>,

    navigations: Vec<String>,
    locates: Vec<Locator>,
    scrolls: Vec<f64>,
    clicks: Vec<Point>,
    escapes: usize,
    html_reads: usize,
    cookies: Vec<CookieSpec>,
}

#[derive(Default)]
pub struct FakeDriver {
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.page_sequence(url, [page])
    }

    /// Successive responses for repeated navigations to `url`.
    pub fn page_sequence(self, url: &str, pages: impl IntoIterator<Item = FakePage>) -> Self {
        self.with_state(|s| {
            s.pages.insert(url.to_string(), pages.into_iter().collect());
        });
        self
    }

    /// Successive `scroll_height` readings; the last one repeats.
    pub fn heights(self, heights: impl IntoIterator<Item = f64>) -> Self {
        self.with_state(|s| s.heights = heights.into_iter().collect());
        self
    }

    pub fn element(self, locator: Locator, located: Located) -> Self {
        self.with_state(|s| {
            s.elements.insert(locator, located);
        });
        self
    }

    pub fn reveal_on_click(self, at: Point, locator: Locator, located: Located) -> Self {
        self.with_state(|s| s.on_click.push((at, locator, located)));
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.with_state(|s| s.navigations.clone())
    }

    pub fn locates(&self) -> Vec<Locator> {
        self.with_state(|s| s.locates.clone())
    }

    pub fn scrolls(&self) -> Vec<f64> {
        self.with_state(|s| s.scrolls.clone())
    }

    pub fn clicks(&self) -> Vec<Point> {
        self.with_state(|s| s.clicks.clone())
    }

    pub fn escapes(&self) -> usize {
        self.with_state(|s| s.escapes)
    }

    pub fn html_reads(&self) -> usize {
        self.with_state(|s| s.html_reads)
    }

    pub fn installed_cookies(&self) -> Vec<CookieSpec> {
        self.with_state(|s| s.cookies.clone())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<Navigation> {
        self.with_state(|s| -> Result<Navigation> {
            s.navigations.push(url.to_string());
            let responses = s
                .pages
                .get_mut(url)
                .filter(|responses| !responses.is_empty())
                .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
            let page = if responses.len() > 1 {
                responses.pop_front()
            } else {
                responses.front().cloned()
            }
            .ok_or_else(|| anyhow!("no response scripted for {url}"))?;
            let final_url = page.final_url.clone().unwrap_or_else(|| url.to_string());
            s.current = Some((final_url.clone(), page.clone()));
            Ok(Navigation {
                status: page.status,
                final_url,
            })
        })
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.with_state(|s| {
            s.current
                .as_ref()
                .map(|(url, page)| page.settled_url.clone().unwrap_or_else(|| url.clone()))
                .unwrap_or_default()
        }))
    }

    async fn html(&self) -> Result<String> {
        self.with_state(|s| {
            s.html_reads += 1;
            s.current
                .as_ref()
                .map(|(_, page)| page.html.clone())
                .ok_or_else(|| anyhow!("no document loaded"))
        })
    }

    async fn scroll_height(&self) -> Result<f64> {
        Ok(self.with_state(|s| {
            if s.heights.len() > 1 {
                s.heights.pop_front().unwrap_or(1000.0)
            } else {
                s.heights.front().copied().unwrap_or(1000.0)
            }
        }))
    }

    async fn viewport_height(&self) -> Result<f64> {
        Ok(800.0)
    }

    async fn scroll_to(&self, y: f64) -> Result<()> {
        self.with_state(|s| s.scrolls.push(y));
        Ok(())
    }

    async fn locate(&self, locator: &Locator) -> Result<Option<Located>> {
        Ok(self.with_state(|s| {
            s.locates.push(locator.clone());
            if *locator == Locator::ContentPresent {
                return s
                    .current
                    .as_ref()
                    .filter(|(_, page)| page.ready)
                    .map(|_| located("content", 0.0, 0.0, ""));
            }
            s.elements.get(locator).cloned()
        }))
    }

    async fn scroll_into_view(&self, element: &Located) -> Result<Option<Point>> {
        Ok(element.center)
    }

    async fn click(&self, point: Point) -> Result<()> {
        self.with_state(|s| {
            s.clicks.push(point);
            let (revealed, pending): (Vec<_>, Vec<_>) =
                s.on_click.drain(..).partition(|(at, _, _)| *at == point);
            s.on_click = pending;
            for (_, locator, located) in revealed {
                s.elements.insert(locator, located);
            }
        });
        Ok(())
    }

    async fn press_escape(&self) -> Result<()> {
        self.with_state(|s| s.escapes += 1);
        Ok(())
    }

    async fn install_cookies(&self, cookies: &[CookieSpec]) -> Result<()> {
        self.with_state(|s| s.cookies.extend_from_slice(cookies));
        Ok(())
    }
}

pub fn located(key: &str, x: f64, y: f64, text: &str) -> Located {
    Located {
        key: key.to_string(),
        center: Some(Point::new(x, y)),
        text: text.to_string(),
        checked: None,
    }
}

/// A picker row reporting whether the item is currently in its list
pub fn picker_row(key: &str, at: Point, label: &str, checked: Option<bool>) -> Located {
    Located {
        checked,
        ..located(key, at.x, at.y, label)
    }
}

/// A session whose `sid` cookie expires in 2100.
pub fn live_session() -> SessionState {
    SessionState::new("test-session.json", vec![auth_cookie(4_102_444_800.0)])
}

pub fn auth_cookie(expires: f64) -> StoredCookie {
    StoredCookie {
        name: "sid".to_string(),
        value: "1:abcdef".to_string(),
        domain: ".medium.com".to_string(),
        path: "/".to_string(),
        expires,
        http_only: true,
        secure: true,
        same_site: Some("Lax".to_string()),
    }
}

/// Defaults with short waits; tests run on a paused clock anyway.
pub fn test_config() -> ScrapeConfig {
    ScrapeConfig::default()
        .with_readiness_timeout_secs(2)
        .with_scroll_settle_ms(100)
        .with_post_click_wait_ms(50)
        .with_poll_interval_ms(100)
        .with_overlay_timeout_secs(1)
}

/// A story page with enough text to clear the content-root threshold
pub fn story_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title} | by Alice | Medium</title></head>
<body>
<nav><a href="/">Medium</a><p>Sign in</p></nav>
<header><a rel="author" href="/@alice">Alice Example</a></header>
<article>
<h1 data-testid="storyTitle">{title}</h1>
{body}
<p>Ownership gives every value a single owner, and the value is dropped when that owner goes out of scope. Borrowing lets code read a value without taking it over.</p>
<p>The compiler checks these rules before the program ever runs, so whole classes of memory bugs never reach production.</p>
</article>
</body>
</html>"#
    )
}

/// A list page with one card per path
pub fn list_html(paths: &[&str]) -> String {
    let cards: String = paths
        .iter()
        .map(|p| {
            format!(
                r#"<div role="article"><a href="{p}"><h2>Story {p}</h2></a><button aria-label="Save">save</button></div>"#
            )
        })
        .collect();
    format!("<html><head><title>Reading list</title></head><body><main>{cards}</main></body></html>")
}
