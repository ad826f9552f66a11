//! Content-root discovery
//!
//! Each [`RootStrategy`] is an independent, pure lookup over a parsed
//! document. [`find_root`] tries them in order and falls back to `<body>`.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::utils::html_utils::visible_text;

static ARTICLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("article").expect("BUG: hardcoded CSS selector 'article' is invalid")
});

static PLATFORM_CONTENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-testid='story-content'], .postArticle-content")
        .expect("BUG: hardcoded CSS selector 'platform content' is invalid")
});

static MAIN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("main, [role='main']")
        .expect("BUG: hardcoded CSS selector \"main, [role='main']\" is invalid")
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

/// Selector text of the last-resort root, reported in extraction failures
pub const BODY_FALLBACK: &str = "body";

/// One way of locating the article's content subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStrategy {
    /// `<article>` container
    SemanticArticle,
    /// Platform-specific content attributes
    PlatformContent,
    /// `<main>` or `role="main"` region
    MainRegion,
}

impl RootStrategy {
    /// Default probing order
    pub const CASCADE: [Self; 3] = [Self::SemanticArticle, Self::PlatformContent, Self::MainRegion];

    #[must_use]
    pub const fn selector_text(self) -> &'static str {
        match self {
            Self::SemanticArticle => "article",
            Self::PlatformContent => "[data-testid='story-content'], .postArticle-content",
            Self::MainRegion => "main, [role='main']",
        }
    }

    fn selector(self) -> &'static Selector {
        match self {
            Self::SemanticArticle => &ARTICLE_SELECTOR,
            Self::PlatformContent => &PLATFORM_CONTENT_SELECTOR,
            Self::MainRegion => &MAIN_SELECTOR,
        }
    }

    /// First match whose visible text has at least `min_text_len` characters.
    #[must_use]
    pub fn find<'a>(self, document: &'a Html, min_text_len: usize) -> Option<ElementRef<'a>> {
        document.select(self.selector()).find(|el| {
            let len = visible_text(*el).trim().chars().count();
            len >= min_text_len
        })
    }
}

/// The chosen root and the strategy that produced it (`None` = body)
#[derive(Debug, Clone, Copy)]
pub struct RootChoice<'a> {
    pub element: ElementRef<'a>,
    pub strategy: Option<RootStrategy>,
}

/// Try `strategies` in order; fall back to `<body>`.
#[must_use]
pub fn find_root<'a>(
    document: &'a Html,
    strategies: &[RootStrategy],
    min_text_len: usize,
) -> Option<RootChoice<'a>> {
    for strategy in strategies {
        if let Some(element) = strategy.find(document, min_text_len) {
            debug!("Content root found via {}", strategy.selector_text());
            return Some(RootChoice {
                element,
                strategy: Some(*strategy),
            });
        }
    }

    debug!("No content root matched, falling back to <body>");
    document.select(&BODY_SELECTOR).next().map(|element| RootChoice {
        element,
        strategy: None,
    })
}

/// Selector texts tried by `strategies`, body fallback included.
#[must_use]
pub fn attempted_selectors(strategies: &[RootStrategy]) -> Vec<String> {
    strategies
        .iter()
        .map(|s| s.selector_text().to_string())
        .chain(std::iter::once(BODY_FALLBACK.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text() -> String {
        "lorem ipsum ".repeat(30)
    }

    #[test]
    fn article_wins_when_substantive() {
        let html = Html::parse_document(&format!(
            "<body><main><article><p>{}</p></article></main></body>",
            long_text()
        ));
        let root = find_root(&html, &RootStrategy::CASCADE, 200).unwrap();
        assert_eq!(root.strategy, Some(RootStrategy::SemanticArticle));
        assert_eq!(root.element.value().name(), "article");
    }

    #[test]
    fn trivial_article_is_skipped() {
        let html = Html::parse_document(&format!(
            "<body><article>tiny</article><div data-testid='story-content'><p>{}</p></div></body>",
            long_text()
        ));
        let root = find_root(&html, &RootStrategy::CASCADE, 200).unwrap();
        assert_eq!(root.strategy, Some(RootStrategy::PlatformContent));
    }

    #[test]
    fn role_main_counts_as_main_region() {
        let html = Html::parse_document(&format!(
            "<body><div role='main'><p>{}</p></div></body>",
            long_text()
        ));
        let found = RootStrategy::MainRegion.find(&html, 200);
        assert!(found.is_some());
    }

    #[test]
    fn falls_back_to_body() {
        let html = Html::parse_document("<body><div><p>Short</p></div></body>");
        let root = find_root(&html, &RootStrategy::CASCADE, 200).unwrap();
        assert_eq!(root.strategy, None);
        assert_eq!(root.element.value().name(), "body");
    }

    #[test]
    fn attempted_lists_body_last() {
        let attempted = attempted_selectors(&RootStrategy::CASCADE);
        assert_eq!(attempted.first().map(String::as_str), Some("article"));
        assert_eq!(attempted.last().map(String::as_str), Some(BODY_FALLBACK));
    }
}
