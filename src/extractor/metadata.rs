//! Title, author and paywall detection over a page snapshot

use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::utils::collapse_whitespace;
use crate::utils::html_utils::visible_text;

pub const UNTITLED: &str = "Untitled";

/// Title candidates, most specific first
pub const TITLE_SELECTORS: &[&str] = &[
    "article h1",
    "h1[data-testid='storyTitle']",
    ".graf--title",
    "h1",
];

pub const AUTHOR_SELECTORS: &[&str] = &[
    "[data-testid='authorName']",
    "a[rel='author']",
    ".pw-author-name",
];

/// Lower-cased body phrases shown on truncated member-only stories
pub const PAYWALL_INDICATORS: &[&str] = &[
    "member-only story",
    "this story is for members only",
    "become a member",
    "sign up to continue",
    "subscribe to read",
];

static TITLE_CASCADE: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(TITLE_SELECTORS));
static AUTHOR_CASCADE: LazyLock<Vec<Selector>> = LazyLock::new(|| parse_all(AUTHOR_SELECTORS));

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid")
});

static ANY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("BUG: hardcoded CSS selector '*' is invalid"));

fn parse_all(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).expect("BUG: hardcoded CSS selector cascade is invalid"))
        .collect()
}

fn first_text(document: &Html, cascade: &[Selector]) -> Option<String> {
    cascade.iter().find_map(|selector| {
        document
            .select(selector)
            .map(|el| collapse_whitespace(&visible_text(el)))
            .find(|text| !text.is_empty())
    })
}

/// Story title, or [`UNTITLED`].
#[must_use]
pub fn extract_title(document: &Html) -> String {
    first_text(document, &TITLE_CASCADE).unwrap_or_else(|| UNTITLED.to_string())
}

/// Author display name, empty when none is shown.
#[must_use]
pub fn extract_author(document: &Html) -> String {
    first_text(document, &AUTHOR_CASCADE).unwrap_or_default()
}

/// The first paywall indicator present in the body text.
#[must_use]
pub fn detect_paywall(document: &Html) -> Option<&'static str> {
    let body = document
        .select(&BODY_SELECTOR)
        .next()
        .map(visible_text)
        .unwrap_or_default()
        .to_lowercase();
    PAYWALL_INDICATORS
        .iter()
        .copied()
        .find(|indicator| body.contains(indicator))
}

/// Compact description of a page, logged when extraction fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: String,
    pub has_article: bool,
    pub has_main: bool,
    pub body_text_len: usize,
    /// Most frequent tags, descending
    pub top_tags: Vec<(String, usize)>,
}

#[must_use]
pub fn page_summary(document: &Html) -> PageSummary {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut has_article = false;
    let mut has_main = false;
    if let Some(body) = document.select(&BODY_SELECTOR).next() {
        for el in body.select(&ANY_SELECTOR) {
            let name = el.value().name();
            has_article |= name == "article";
            has_main |= name == "main";
            *counts.entry(name.to_string()).or_default() += 1;
        }
    }
    let mut top_tags: Vec<(String, usize)> = counts.into_iter().collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_tags.truncate(15);

    let body_text_len = document
        .select(&BODY_SELECTOR)
        .next()
        .map(|b| visible_text(b).chars().count())
        .unwrap_or(0);

    PageSummary {
        title,
        has_article,
        has_main,
        body_text_len,
        top_tags,
    }
}
