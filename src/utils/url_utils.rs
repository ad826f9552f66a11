//! URL and path helpers for platform links.
//!
//! Anchors on list pages mix relative paths, absolute URLs, tracking query
//! strings and trailing slashes. Everything that compares links goes through
//! [`normalize_path`] so two spellings of the same story collapse to one key.

use url::Url;

/// Resolve `href` against `base`, returning `None` for non-http targets.
#[must_use]
pub fn absolute_url(base: &str, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then_some(joined)
}

/// Normalize a link to the dedupe key used for list candidates.
///
/// Query string and fragment are dropped and trailing slashes removed. The
/// root path stays `/`.
#[must_use]
pub fn normalize_path(base: &str, href: &str) -> Option<String> {
    let url = absolute_url(base, href)?;
    let trimmed = url.path().trim_end_matches('/');
    if trimmed.is_empty() {
        Some("/".to_string())
    } else {
        Some(trimmed.to_string())
    }
}

/// Check if a URL is valid
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
