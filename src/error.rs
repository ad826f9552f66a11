//! Error types for navigation, extraction and list automation
//!
//! Every variant carries enough context (URL, selectors tried, labels seen)
//! to act on the failure without re-running in verbose mode.

use thiserror::Error;

/// Result type alias for mediumscrape operations
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Error taxonomy for single-page and setup failures
///
/// Per-item removal failures are not errors; they are reported through
/// [`crate::automator::RemovalFailureReason`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    /// No persisted session blob is available
    #[error("No Medium session at {path}: {detail}. Run the login flow first.")]
    SessionMissing { path: String, detail: String },

    /// The session blob exists but no authentication cookie is still valid
    #[error("Medium session at {path} has expired ({detail}). Log in again.")]
    SessionExpired { path: String, detail: String },

    /// The navigation landed on a sign-in page instead of the requested URL
    #[error("Redirected to sign-in while loading {url} (ended at {final_url}); session is no longer accepted")]
    SignInRedirect { url: String, final_url: String },

    /// The server answered with a 4xx/5xx status
    #[error("HTTP {status} while loading {url}")]
    HttpError { url: String, status: u16 },

    /// The page rendered but carries no article and shows a not-found message
    #[error("Page not found: {url} (ended at {final_url})")]
    PageNotFound { url: String, final_url: String },

    /// No usable content root could be extracted
    #[error("Could not extract content from {url}; tried selectors: {}", attempted.join(", "))]
    ExtractionFailed { url: String, attempted: Vec<String> },

    /// The named list could not be located
    #[error("List '{label}' not found; available lists: {}", format_available(available))]
    ListNotFound { label: String, available: Vec<String> },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Browser or CDP communication failure
    #[error("Browser error: {0}")]
    Browser(String),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none detected)".to_string()
    } else {
        available.join(", ")
    }
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::Browser(format!("{err:#}"))
    }
}

impl ScrapeError {
    /// Session failures invalidate everything that follows in the same run.
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::SessionMissing { .. } | Self::SessionExpired { .. } | Self::SignInRedirect { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_not_found_enumerates_labels() {
        let err = ScrapeError::ListNotFound {
            label: "Rust".to_string(),
            available: vec!["Reading list".to_string(), "Go".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "List 'Rust' not found; available lists: Reading list, Go"
        );
    }

    #[test]
    fn list_not_found_never_prints_bare_message() {
        let err = ScrapeError::ListNotFound {
            label: "Rust".to_string(),
            available: vec![],
        };
        assert!(err.to_string().contains("(none detected)"));
    }

    #[test]
    fn anyhow_keeps_context_chain() {
        let err = anyhow::anyhow!("socket closed").context("evaluate scrollHeight");
        let converted: ScrapeError = err.into();
        assert_eq!(
            converted,
            ScrapeError::Browser("evaluate scrollHeight: socket closed".to_string())
        );
    }

    #[test]
    fn session_errors_are_flagged() {
        assert!(
            ScrapeError::SessionMissing {
                path: "s.json".into(),
                detail: "missing".into()
            }
            .is_session_error()
        );
        assert!(
            !ScrapeError::HttpError {
                url: "u".into(),
                status: 404
            }
            .is_session_error()
        );
    }
}
