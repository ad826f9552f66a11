//! Article content extraction
//!
//! The live page is preloaded (scrolled through so lazy blocks render), then
//! a fresh snapshot is parsed with `scraper` and walked into
//! [`ContentNode`]s. Everything after the snapshot is pure and synchronous.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod metadata;
pub mod nodes;
pub mod render;
pub mod root;
pub mod walker;

pub use metadata::{PageSummary, detect_paywall, extract_author, extract_title, page_summary};
pub use nodes::{ContentNode, InlineRun, StyleContext};
pub use render::{parse_inline, render_markdown, split_markdown};
pub use root::{RootStrategy, find_root};

use crate::browser::{PageDriver, with_page_timeout, within};
use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::navigator::{self, DocumentHandle};
use crate::session::BrowsingContext;
use crate::utils::constants::PRELOAD_STEP_DELAY_MS;

/// Body text needed before fallback paragraphs are worth returning
const MIN_FALLBACK_CHARS: usize = 200;

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

/// A fetched story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub author: String,
    pub nodes: Vec<ContentNode>,
    /// Paywall detected or only fallback text was recoverable
    pub is_preview_only: bool,
}

impl Article {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        render_markdown(&self.nodes)
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.plain_text().split_whitespace().count())
            .sum()
    }

    #[must_use]
    pub fn char_count(&self) -> usize {
        self.to_markdown().chars().count()
    }
}

/// Scroll through the page in viewport steps, return to the top and wait
/// for the document height to stop changing.
///
/// Bounded by the scroll timeout; expiry is logged and the caller proceeds.
pub async fn preload<D>(driver: &D, config: &ScrapeConfig) -> ScrapeResult<()>
where
    D: PageDriver + ?Sized,
{
    let steps = async {
        let viewport = driver.viewport_height().await?.max(1.0);
        for step in 1..=config.preload_scroll_steps() {
            driver.scroll_to(viewport * f64::from(step)).await?;
            tokio::time::sleep(Duration::from_millis(PRELOAD_STEP_DELAY_MS)).await;
        }
        driver.scroll_to(0.0).await?;
        settle_height(driver, config).await
    };

    if within(steps, config.scroll_timeout()).await?.is_none() {
        warn!(
            "Preload did not settle within {:?}; extracting current DOM",
            config.scroll_timeout()
        );
    }
    Ok(())
}

/// Poll the document height until two consecutive readings agree.
async fn settle_height<D>(driver: &D, config: &ScrapeConfig) -> anyhow::Result<()>
where
    D: PageDriver + ?Sized,
{
    let mut previous = driver.scroll_height().await?;
    for _ in 0..config.max_scroll_iterations() {
        tokio::time::sleep(config.scroll_settle()).await;
        let height = driver.scroll_height().await?;
        if height == previous {
            debug!(height, "Document height settled");
            return Ok(());
        }
        previous = height;
    }
    Ok(())
}

/// Preload the live page and take a fresh snapshot, falling back to the
/// snapshot captured at load time.
async fn refresh_snapshot<D>(document: &DocumentHandle<'_, D>, config: &ScrapeConfig) -> String
where
    D: PageDriver + ?Sized,
{
    if let Err(e) = preload(document.driver(), config).await {
        warn!("Preload failed for {}: {e}", document.url());
    }
    match with_page_timeout(
        document.driver().html(),
        config.navigation_timeout(),
        "DOM snapshot",
    )
    .await
    {
        Ok(html) => html,
        Err(e) => {
            warn!("Re-snapshot failed for {}: {e:#}; using load-time snapshot", document.url());
            document.html().to_string()
        }
    }
}

/// Extract content nodes from a validated page.
pub async fn extract<D>(
    document: &DocumentHandle<'_, D>,
    config: &ScrapeConfig,
) -> ScrapeResult<Vec<ContentNode>>
where
    D: PageDriver + ?Sized,
{
    let html = refresh_snapshot(document, config).await;
    extract_from_html(&html, document.final_url(), config.min_root_text_len())
}

/// Extract content nodes from an HTML snapshot loaded at `url`.
pub fn extract_from_html(html: &str, url: &str, min_root_text_len: usize) -> ScrapeResult<Vec<ContentNode>> {
    let document = Html::parse_document(html);
    extract_nodes(&document, url, min_root_text_len)
}

fn extract_nodes(document: &Html, url: &str, min_root_text_len: usize) -> ScrapeResult<Vec<ContentNode>> {
    let strategies = RootStrategy::CASCADE;
    let nodes = find_root(document, &strategies, min_root_text_len)
        .map(|root| walker::walk(root.element, url))
        .unwrap_or_default();

    if nodes.is_empty() {
        log_page_summary(document, url);
        return Err(ScrapeError::ExtractionFailed {
            url: url.to_string(),
            attempted: root::attempted_selectors(&strategies),
        });
    }

    debug!("Extracted {} blocks from {url}", nodes.len());
    Ok(nodes)
}

fn log_page_summary(document: &Html, url: &str) {
    let summary = page_summary(document);
    warn!(
        "Content extraction failed for {url}: title={:?}, article={}, main={}, body_text_len={}",
        summary.title, summary.has_article, summary.has_main, summary.body_text_len
    );
    warn!("  top tags: {:?}", summary.top_tags);
}

/// Load `url` and extract a full [`Article`].
///
/// When the structured walk finds nothing but the page still has
/// substantive text, that text is returned as plain paragraphs and the
/// article is flagged preview-only.
pub async fn fetch_article<D>(
    context: &BrowsingContext<D>,
    url: &str,
    config: &ScrapeConfig,
) -> ScrapeResult<Article>
where
    D: PageDriver,
{
    let document = navigator::load(context, url, config).await?.into_document()?;
    let html = refresh_snapshot(&document, config).await;
    let final_url = document.final_url().to_string();
    article_from_html(url, &final_url, &html, config.min_root_text_len())
}

/// Build an [`Article`] from a snapshot; `url` is what the caller asked for.
pub fn article_from_html(
    url: &str,
    final_url: &str,
    html: &str,
    min_root_text_len: usize,
) -> ScrapeResult<Article> {
    let parsed = Html::parse_document(html);
    let title = extract_title(&parsed);
    let author = extract_author(&parsed);
    let paywall = detect_paywall(&parsed);
    if let Some(indicator) = paywall {
        warn!("Paywall detected on {url}: {indicator}");
    }

    let (nodes, is_preview_only) = match extract_nodes(&parsed, final_url, min_root_text_len) {
        Ok(nodes) => (nodes, paywall.is_some()),
        Err(err) => {
            let fallback = parsed
                .select(&BODY_SELECTOR)
                .next()
                .map(walker::fallback_paragraphs)
                .unwrap_or_default();
            let chars: usize = fallback.iter().map(|n| n.plain_text().chars().count()).sum();
            if chars <= MIN_FALLBACK_CHARS {
                return Err(err);
            }
            warn!("Using fallback text extraction for {url} ({chars} chars)");
            (fallback, true)
        }
    };

    let article = Article {
        url: url.to_string(),
        title,
        author,
        nodes,
        is_preview_only,
    };
    info!(
        "Fetched \"{}\" ({} chars){}",
        article.title,
        article.char_count(),
        if article.is_preview_only { " [preview only]" } else { "" }
    );
    Ok(article)
}
