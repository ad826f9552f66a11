//! List discovery and item harvesting
//!
//! A list is opened either through its fixed path (the default reading
//! list) or by finding its name on the lists index. The opened page is
//! scrolled until it stops growing and its item links are collected.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub mod candidates;
pub mod scroll;

pub use candidates::{CandidatePatterns, ListCandidate, PatternMatch, extract_candidates};
pub use scroll::{ScrollOutcome, scroll_to_exhaustion};

use crate::browser::{PageDriver, with_page_timeout};
use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::navigator::{self, DocumentHandle};
use crate::session::BrowsingContext;
use crate::utils::collapse_whitespace;
use crate::utils::constants::{DEFAULT_LIST_LABEL, LISTS_INDEX_PATH, READING_LIST_PATH};
use crate::utils::html_utils::visible_text;
use crate::utils::url_utils::absolute_url;

static LABEL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3, a").expect("BUG: hardcoded CSS selector 'h2, h3, a' is invalid")
});

static LIST_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3").expect("BUG: hardcoded CSS selector 'h2, h3' is invalid")
});

/// Find the link for `label` on a lists-index snapshot.
///
/// Headings and anchors are scanned in document order for a case-sensitive
/// substring match; the nearest enclosing anchor supplies the URL. On a miss
/// the list names that were visible are returned instead.
pub fn find_list_link(html: &str, base_url: &str, label: &str) -> Result<String, Vec<String>> {
    let document = Html::parse_document(html);

    for element in document.select(&LABEL_SELECTOR) {
        let text = collapse_whitespace(&visible_text(element));
        if !text.contains(label) {
            continue;
        }
        if let Some(url) = enclosing_anchor(element).and_then(|href| absolute_url(base_url, href)) {
            debug!("List '{label}' matched element text '{text}'");
            return Ok(url.to_string());
        }
    }

    let mut available: Vec<String> = Vec::new();
    for heading in document.select(&LIST_NAME_SELECTOR) {
        let name = collapse_whitespace(&visible_text(heading));
        if !name.is_empty() && !available.contains(&name) {
            available.push(name);
        }
    }
    Err(available)
}

fn enclosing_anchor(element: ElementRef<'_>) -> Option<&str> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
}

/// URL of the list page for `label`.
///
/// The default label maps to its fixed path without touching the page. Any
/// other label is looked up on the lists index, reloading up to
/// `list_lookup_attempts` times before giving up. The matched link is
/// returned as a URL and loaded by navigation, never clicked, so a list
/// behind a script-only control without an `href` is not found.
pub async fn resolve_list_url<D>(
    context: &BrowsingContext<D>,
    label: &str,
    config: &ScrapeConfig,
) -> ScrapeResult<String>
where
    D: PageDriver,
{
    if label == DEFAULT_LIST_LABEL {
        return Ok(config.platform_url(READING_LIST_PATH));
    }

    let index_url = config.platform_url(LISTS_INDEX_PATH);
    let attempts = config.list_lookup_attempts();
    let mut available = Vec::new();

    for attempt in 1..=attempts {
        let document = navigator::load(context, &index_url, config).await?.into_document()?;
        let html = settled_snapshot(&document, config).await?;

        match find_list_link(&html, document.final_url(), label) {
            Ok(url) => {
                info!("Resolved list '{label}' to {url}");
                return Ok(url);
            }
            Err(seen) => {
                warn!(
                    "List '{label}' not on index (attempt {attempt}/{attempts}); saw {} lists",
                    seen.len()
                );
                available = seen;
            }
        }
    }

    Err(ScrapeError::ListNotFound {
        label: label.to_string(),
        available,
    })
}

/// Open the list page at `list_url` and scroll it to exhaustion.
pub async fn open_list<'a, D>(
    context: &'a BrowsingContext<D>,
    list_url: &str,
    config: &ScrapeConfig,
) -> ScrapeResult<DocumentHandle<'a, D>>
where
    D: PageDriver,
{
    let document = navigator::load(context, list_url, config).await?.into_document()?;
    scroll_to_exhaustion(document.driver(), config).await?;
    Ok(document)
}

async fn settled_snapshot<D>(document: &DocumentHandle<'_, D>, config: &ScrapeConfig) -> ScrapeResult<String>
where
    D: PageDriver + ?Sized,
{
    scroll_to_exhaustion(document.driver(), config).await?;
    Ok(with_page_timeout(document.driver().html(), config.navigation_timeout(), "DOM snapshot").await?)
}

/// Collect every item link on the list named `list_label`.
pub async fn harvest<D>(
    context: &BrowsingContext<D>,
    list_label: &str,
    config: &ScrapeConfig,
) -> ScrapeResult<Vec<ListCandidate>>
where
    D: PageDriver,
{
    harvest_with(context, list_label, config, &CandidatePatterns::default()).await
}

/// [`harvest`] with custom link patterns.
pub async fn harvest_with<D>(
    context: &BrowsingContext<D>,
    list_label: &str,
    config: &ScrapeConfig,
    patterns: &CandidatePatterns,
) -> ScrapeResult<Vec<ListCandidate>>
where
    D: PageDriver,
{
    let list_url = resolve_list_url(context, list_label, config).await?;
    let document = open_list(context, &list_url, config).await?;
    let html = with_page_timeout(document.driver().html(), config.navigation_timeout(), "DOM snapshot").await?;

    let candidates = extract_candidates(&html, document.final_url(), patterns);
    info!("Harvested {} items from '{list_label}'", candidates.len());
    Ok(candidates)
}
