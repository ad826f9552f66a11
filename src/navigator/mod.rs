//! Page loading and classification
//!
//! [`load`] is the single entry point every other component uses to reach a
//! page. It never retries; callers decide whether a failed load is fatal.

use std::fmt;
use tracing::{debug, info, warn};

pub mod classify;

pub use classify::{PageSignals, is_not_found, is_sign_in_url, page_signals};

use crate::browser::{Locator, PageDriver, wait_for, with_page_timeout};
use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::session::BrowsingContext;

/// Classification of one navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Valid,
    NotFound,
    Redirected,
    HttpError(u16),
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::NotFound => write!(f, "not-found"),
            Self::Redirected => write!(f, "redirected"),
            Self::HttpError(code) => write!(f, "http-{code}"),
        }
    }
}

/// A loaded, valid page: the live driver plus the snapshot taken at load
pub struct DocumentHandle<'a, D: ?Sized> {
    driver: &'a D,
    url: String,
    final_url: String,
    html: String,
}

impl<'a, D: PageDriver + ?Sized> DocumentHandle<'a, D> {
    pub fn driver(&self) -> &'a D {
        self.driver
    }

    /// URL as requested
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    /// HTML captured right after classification
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Result of [`load`]; a document exists iff the status is `Valid`
pub struct PageLoadResult<'a, D: ?Sized> {
    url: String,
    final_url: String,
    status: PageStatus,
    document: Option<DocumentHandle<'a, D>>,
}

impl<'a, D: PageDriver + ?Sized> PageLoadResult<'a, D> {
    fn valid(document: DocumentHandle<'a, D>) -> Self {
        Self {
            url: document.url.clone(),
            final_url: document.final_url.clone(),
            status: PageStatus::Valid,
            document: Some(document),
        }
    }

    fn invalid(url: &str, final_url: String, status: PageStatus) -> Self {
        debug_assert!(status != PageStatus::Valid);
        Self {
            url: url.to_string(),
            final_url,
            status,
            document: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn document(&self) -> Option<&DocumentHandle<'a, D>> {
        self.document.as_ref()
    }

    /// The document for a valid page, otherwise the matching error.
    pub fn into_document(self) -> ScrapeResult<DocumentHandle<'a, D>> {
        match (self.status, self.document) {
            (PageStatus::Valid, Some(document)) => Ok(document),
            (PageStatus::HttpError(status), _) => Err(ScrapeError::HttpError {
                url: self.url,
                status,
            }),
            (PageStatus::Redirected, _) => Err(ScrapeError::SignInRedirect {
                url: self.url,
                final_url: self.final_url,
            }),
            (PageStatus::NotFound | PageStatus::Valid, _) => Err(ScrapeError::PageNotFound {
                url: self.url,
                final_url: self.final_url,
            }),
        }
    }
}

/// Navigate to `url` and classify what rendered.
///
/// Session problems fail before the navigation starts. An HTTP error status
/// returns immediately, before any readiness wait or snapshot.
pub async fn load<'a, D>(
    context: &'a BrowsingContext<D>,
    url: &str,
    config: &ScrapeConfig,
) -> ScrapeResult<PageLoadResult<'a, D>>
where
    D: PageDriver,
{
    context.ensure_valid()?;
    let driver = context.driver();

    info!("Loading {url}");
    let navigation = driver.navigate(url).await?;

    if let Some(status) = navigation.status
        && status >= 400
    {
        warn!("HTTP error status {status} for {url}");
        return Ok(PageLoadResult::invalid(
            url,
            navigation.final_url,
            PageStatus::HttpError(status),
        ));
    }

    if is_sign_in_url(&navigation.final_url) {
        warn!("Redirected to sign-in: {url} -> {}", navigation.final_url);
        return Ok(PageLoadResult::invalid(
            url,
            navigation.final_url,
            PageStatus::Redirected,
        ));
    }

    let ready = wait_for(
        driver,
        &Locator::ContentPresent,
        config.readiness_timeout(),
        config.poll_interval(),
    )
    .await?;
    if ready.is_none() {
        debug!(
            "No content signal within {:?} for {url}; classifying current DOM",
            config.readiness_timeout()
        );
    }

    // Client-side redirects can land after the navigation response
    let current = driver.current_url().await?;
    let final_url = if current.is_empty() {
        navigation.final_url
    } else {
        current
    };
    if is_sign_in_url(&final_url) {
        warn!("Redirected to sign-in after load: {url} -> {final_url}");
        return Ok(PageLoadResult::invalid(url, final_url, PageStatus::Redirected));
    }

    let html = with_page_timeout(driver.html(), config.navigation_timeout(), "DOM snapshot").await?;
    if is_not_found(&html, &final_url) {
        return Ok(PageLoadResult::invalid(url, final_url, PageStatus::NotFound));
    }

    debug!(bytes = html.len(), "Page {url} is valid");
    Ok(PageLoadResult::valid(DocumentHandle {
        driver,
        url: url.to_string(),
        final_url,
        html,
    }))
}
