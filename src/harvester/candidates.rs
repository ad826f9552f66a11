//! Item-link recognition on list pages
//!
//! Story links come in three strict shapes. When a layout change hides all
//! of them, a relaxed "ends in a hash-like segment" pattern takes over.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{ScrapeError, ScrapeResult};
use crate::utils::url_utils::{absolute_url, normalize_path};

/// `/@user/slug-hash`, `/publication/slug-hash`, `/p/hash`
pub const DEFAULT_STRICT_PATTERNS: &[&str] = &[
    r"^/@[A-Za-z0-9_.\-]+/[^/]+-[0-9a-f]{8,16}$",
    r"^/[A-Za-z0-9_.\-]+/[^/]+-[0-9a-f]{8,16}$",
    r"^/p/[0-9a-f]{8,16}$",
];

/// Any path whose last segment ends in a hash-like token
pub const DEFAULT_RELAXED_PATTERNS: &[&str] = &[r"(?:^|[/\-])[0-9a-f]{8,16}$"];

/// Account, navigation and collection pages that are never items
pub const DEFAULT_EXCLUSION_PATTERNS: &[&str] = &[
    r"^/(?:me|m|settings|tag|tags|topic|topics|plans|membership|search|signin|sign-in|signup|login|about|help|jobs|policy|privacy|creators|verified-authors)(?:/|$)",
    r"/(?:lists?|followers|following|about|subscribe|responses|highlights)(?:/|$)",
];

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

/// A link believed to reference a list item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListCandidate {
    /// Absolute URL as resolved from the anchor
    pub href: String,
    /// Dedupe key: path without query, fragment or trailing slash
    pub normalized_path: String,
}

/// Which pattern set accepted a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch {
    Strict,
    Relaxed,
}

/// Strict, relaxed and exclusion pattern sets
#[derive(Debug, Clone)]
pub struct CandidatePatterns {
    strict: Vec<Regex>,
    relaxed: Vec<Regex>,
    exclusions: Vec<Regex>,
}

impl Default for CandidatePatterns {
    fn default() -> Self {
        let compile = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("BUG: hardcoded candidate pattern is invalid"))
                .collect()
        };
        Self {
            strict: compile(DEFAULT_STRICT_PATTERNS),
            relaxed: compile(DEFAULT_RELAXED_PATTERNS),
            exclusions: compile(DEFAULT_EXCLUSION_PATTERNS),
        }
    }
}

fn compile_all(kind: &str, patterns: &[impl AsRef<str>]) -> ScrapeResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p.as_ref())
                .map_err(|e| ScrapeError::Config(format!("invalid {kind} pattern '{}': {e}", p.as_ref())))
        })
        .collect()
}

impl CandidatePatterns {
    /// Build from custom pattern strings.
    pub fn new(
        strict: &[impl AsRef<str>],
        relaxed: &[impl AsRef<str>],
        exclusions: &[impl AsRef<str>],
    ) -> ScrapeResult<Self> {
        Ok(Self {
            strict: compile_all("strict", strict)?,
            relaxed: compile_all("relaxed", relaxed)?,
            exclusions: compile_all("exclusion", exclusions)?,
        })
    }

    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.iter().any(|re| re.is_match(path))
    }

    /// Classify a normalized path.
    #[must_use]
    pub fn classify(&self, path: &str) -> Option<PatternMatch> {
        if self.is_excluded(path) {
            None
        } else if self.strict.iter().any(|re| re.is_match(path)) {
            Some(PatternMatch::Strict)
        } else if self.relaxed.iter().any(|re| re.is_match(path)) {
            Some(PatternMatch::Relaxed)
        } else {
            None
        }
    }
}

/// Item links on a list page, strict matches first.
///
/// Relaxed matches are only used when no anchor matches strictly. Results
/// are deduplicated by normalized path in first-seen order.
#[must_use]
pub fn extract_candidates(html: &str, base_url: &str, patterns: &CandidatePatterns) -> Vec<ListCandidate> {
    let document = Html::parse_document(html);

    let mut strict = Vec::new();
    let mut relaxed = Vec::new();
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let (Some(url), Some(path)) = (absolute_url(base_url, href), normalize_path(base_url, href))
        else {
            continue;
        };
        let mut clean = url;
        clean.set_query(None);
        clean.set_fragment(None);
        let candidate = ListCandidate {
            href: clean.to_string(),
            normalized_path: path,
        };
        match patterns.classify(&candidate.normalized_path) {
            Some(PatternMatch::Strict) => strict.push(candidate),
            Some(PatternMatch::Relaxed) => relaxed.push(candidate),
            None => {}
        }
    }

    let chosen = if strict.is_empty() {
        if !relaxed.is_empty() {
            debug!("No strict item links; using {} relaxed matches", relaxed.len());
        }
        relaxed
    } else {
        strict
    };
    dedupe(chosen)
}

fn dedupe(candidates: Vec<ListCandidate>) -> Vec<ListCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.normalized_path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://medium.com/me/list/reading-list";

    fn paths(candidates: &[ListCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.normalized_path.as_str()).collect()
    }

    #[test]
    fn strict_shapes_match() {
        let p = CandidatePatterns::default();
        assert_eq!(p.classify("/@alice/rust-tips-1a2b3c4d5e6f"), Some(PatternMatch::Strict));
        assert_eq!(p.classify("/better-programming/async-rust-0f1e2d3c4b5a"), Some(PatternMatch::Strict));
        assert_eq!(p.classify("/p/1a2b3c4d5e6f"), Some(PatternMatch::Strict));
    }

    #[test]
    fn exclusions_win() {
        let p = CandidatePatterns::default();
        assert_eq!(p.classify("/tag/rust-1a2b3c4d5e6f"), None);
        assert_eq!(p.classify("/@alice/list/rust-1a2b3c4d5e6f"), None);
        assert_eq!(p.classify("/@alice/followers"), None);
        assert_eq!(p.classify("/me/lists"), None);
        assert_eq!(p.classify("/plans"), None);
    }

    #[test]
    fn relaxed_catches_odd_shapes() {
        let p = CandidatePatterns::default();
        assert_eq!(p.classify("/s/x/y/story-1a2b3c4d5e6f"), Some(PatternMatch::Relaxed));
        assert_eq!(p.classify("/@alice"), None);
    }

    #[test]
    fn dedupes_by_normalized_path_in_order() {
        let html = r#"<body>
            <a href="/@bob/second-aaaaaaaa1111?source=list">x</a>
            <a href="/@bob/first-bbbbbbbb2222">x</a>
            <a href="https://medium.com/@bob/second-aaaaaaaa1111/">x</a>
            <a href="/@bob/first-bbbbbbbb2222#responses">x</a>
            <a href="/tag/rust">x</a>
        </body>"#;
        let found = extract_candidates(html, BASE, &CandidatePatterns::default());
        assert_eq!(
            paths(&found),
            vec!["/@bob/second-aaaaaaaa1111", "/@bob/first-bbbbbbbb2222"]
        );
        assert_eq!(found[0].href, "https://medium.com/@bob/second-aaaaaaaa1111");
    }

    #[test]
    fn relaxed_ignored_when_strict_present() {
        let html = r#"<a href="/p/1a2b3c4d5e6f">a</a><a href="/s/x/y/z-0a0b0c0d0e0f">b</a>"#;
        let found = extract_candidates(html, BASE, &CandidatePatterns::default());
        assert_eq!(paths(&found), vec!["/p/1a2b3c4d5e6f"]);
    }

    #[test]
    fn custom_patterns_are_validated() {
        let err = CandidatePatterns::new(&["("], &[r"x"], &[r"y"]).unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }
}
