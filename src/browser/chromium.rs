//! [`PageDriver`] over a chromiumoxide [`Page`]

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::driver::{CookieSpec, Located, Locator, Navigation, PageDriver, Point};
use super::js_scripts;
use super::page_timeout::within;

/// Drives one chromiumoxide page
///
/// Cheap to clone; clones share the underlying CDP target.
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: Page,
    navigation_timeout: Duration,
}

impl ChromiumDriver {
    #[must_use]
    pub fn new(page: Page, navigation_timeout: Duration) -> Self {
        Self {
            page,
            navigation_timeout,
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String, what: &str) -> Result<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .with_context(|| format!("Failed to evaluate {what}"))?;
        result
            .into_value::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to convert {what} result: {e:?}"))
    }

    /// Evaluate a script that returns `JSON.stringify(..)` of a nullable value.
    async fn eval_json<T: DeserializeOwned>(&self, script: String, what: &str) -> Result<Option<T>> {
        let raw: String = self.eval(script, what).await?;
        serde_json::from_str::<Option<T>>(&raw)
            .with_context(|| format!("Malformed {what} payload: {raw}"))
    }

    async fn dispatch_key(&self, kind: DispatchKeyEventType) -> Result<()> {
        let params = DispatchKeyEventParams::builder()
            .r#type(kind)
            .key("Escape")
            .code("Escape")
            .windows_virtual_key_code(27)
            .native_virtual_key_code(27)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build key event: {e}"))?;
        self.page
            .execute(params)
            .await
            .context("Failed to dispatch key event")?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<Navigation> {
        debug!("Navigating to {url}");
        let loaded = within(
            async {
                self.page
                    .goto(url)
                    .await
                    .with_context(|| format!("Failed to navigate to {url}"))?;
                Ok(())
            },
            self.navigation_timeout,
        )
        .await?;
        if loaded.is_none() {
            warn!(
                "Navigation to {url} still loading after {:.1}s; continuing with current DOM",
                self.navigation_timeout.as_secs_f64()
            );
        }

        let status: i64 = self
            .eval(js_scripts::RESPONSE_STATUS.to_string(), "response status")
            .await
            .unwrap_or(0);
        let final_url = self.current_url().await?;
        trace!(status, final_url = %final_url, "Navigation settled");

        Ok(Navigation {
            status: u16::try_from(status).ok().filter(|s| *s > 0),
            final_url,
        })
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self
            .page
            .url()
            .await
            .context("Failed to read page URL")?
            .unwrap_or_default())
    }

    async fn html(&self) -> Result<String> {
        self.eval(js_scripts::OUTER_HTML.to_string(), "document HTML")
            .await
    }

    async fn scroll_height(&self) -> Result<f64> {
        self.eval(js_scripts::SCROLL_HEIGHT.to_string(), "scroll height")
            .await
    }

    async fn viewport_height(&self) -> Result<f64> {
        self.eval(js_scripts::VIEWPORT_HEIGHT.to_string(), "viewport height")
            .await
    }

    async fn scroll_to(&self, y: f64) -> Result<()> {
        let _: bool = self.eval(js_scripts::scroll_to(y), "scroll").await?;
        Ok(())
    }

    async fn locate(&self, locator: &Locator) -> Result<Option<Located>> {
        self.eval_json(js_scripts::locate(locator), &locator.describe())
            .await
    }

    async fn scroll_into_view(&self, element: &Located) -> Result<Option<Point>> {
        self.eval_json(js_scripts::scroll_into_view(&element.key), "scrollIntoView")
            .await
    }

    async fn click(&self, point: Point) -> Result<()> {
        trace!(x = point.x, y = point.y, "Dispatching click");
        self.page
            .click(chromiumoxide::layout::Point {
                x: point.x,
                y: point.y,
            })
            .await
            .context("Failed to dispatch mouse click")?;
        Ok(())
    }

    async fn press_escape(&self) -> Result<()> {
        self.dispatch_key(DispatchKeyEventType::KeyDown).await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp).await
    }

    async fn install_cookies(&self, cookies: &[CookieSpec]) -> Result<()> {
        let params = cookies
            .iter()
            .map(cookie_param)
            .collect::<Result<Vec<_>>>()?;
        if params.is_empty() {
            return Ok(());
        }
        debug!("Installing {} session cookies", params.len());
        self.page
            .set_cookies(params)
            .await
            .context("Failed to install session cookies")?;
        Ok(())
    }
}

fn cookie_param(cookie: &CookieSpec) -> Result<CookieParam> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .http_only(cookie.http_only)
        .secure(cookie.secure);

    if let Some(expires) = cookie.expires {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }
    let same_site = match cookie.same_site.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("strict") => Some(CookieSameSite::Strict),
        Some("lax") => Some(CookieSameSite::Lax),
        Some("none") => Some(CookieSameSite::None),
        _ => None,
    };
    if let Some(same_site) = same_site {
        builder = builder.same_site(same_site);
    }

    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid cookie {}: {e}", cookie.name))
}
