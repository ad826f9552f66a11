//! Pure page classification over an HTML snapshot
//!
//! A page is only `NotFound` when a textual not-found signal fires AND the
//! structural article signals are absent. Error phrases quoted inside a real
//! article never invalidate it.

use log::debug;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::utils::collapse_whitespace;
use crate::utils::html_utils::visible_text;

/// Title the platform serves on its generic error pages
pub const BARE_PLATFORM_TITLE: &str = "Medium";

/// Lower-cased body phrases indicating a missing page
pub const NOT_FOUND_PHRASES: &[&str] = &[
    "page not found",
    "this page doesn",
    "out of nothing, something",
];

static STRUCTURE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "h1, article, [data-testid='storyTitle'], [data-testid='story-content'], main, [role='main']",
    )
    .expect("BUG: hardcoded CSS selector 'structure' is invalid")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid")
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

/// Evidence gathered from one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSignals {
    pub title: String,
    /// Which not-found cue fired, if any
    pub not_found_cue: Option<String>,
    pub has_article_structure: bool,
}

impl PageSignals {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.not_found_cue.is_some() && !self.has_article_structure
    }
}

/// Gather classification signals from `html` loaded at `final_url`.
#[must_use]
pub fn page_signals(html: &str, final_url: &str) -> PageSignals {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .unwrap_or_default();

    let body_text = document
        .select(&BODY_SELECTOR)
        .next()
        .map(visible_text)
        .unwrap_or_default()
        .to_lowercase();

    let not_found_cue = if title == BARE_PLATFORM_TITLE {
        Some(format!("title is bare '{BARE_PLATFORM_TITLE}'"))
    } else if final_url.contains("/404") {
        Some("URL contains /404".to_string())
    } else if let Some(phrase) = NOT_FOUND_PHRASES.iter().find(|p| body_text.contains(*p)) {
        Some(format!("body contains '{phrase}'"))
    } else if body_text.contains("404") && body_text.contains("not found") {
        Some("body contains '404' and 'not found'".to_string())
    } else {
        None
    };

    let has_article_structure = document.select(&STRUCTURE_SELECTOR).next().is_some();

    PageSignals {
        title,
        not_found_cue,
        has_article_structure,
    }
}

/// True when `url` points at a sign-in or login page.
#[must_use]
pub fn is_sign_in_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed
        .host_str()
        .is_some_and(|host| host.starts_with("signin.") || host.starts_with("login."))
    {
        return true;
    }
    parsed.path_segments().is_some_and(|mut segments| {
        segments.any(|s| matches!(s, "signin" | "sign-in" | "login" | "signup"))
    })
}

/// True when the snapshot is a rendered not-found page.
#[must_use]
pub fn is_not_found(html: &str, final_url: &str) -> bool {
    let signals = page_signals(html, final_url);
    if signals.is_not_found() {
        debug!(
            "Not-found page at {}: {}",
            final_url,
            signals.not_found_cue.as_deref().unwrap_or_default()
        );
    }
    signals.is_not_found()
}
