//! Persisted storage-state blob produced by the login flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::browser::CookieSpec;
use crate::error::{ScrapeError, ScrapeResult};

/// Cookies whose presence means the platform considers us logged in
pub const AUTH_COOKIE_NAMES: &[&str] = &["sid", "uid"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch; zero or negative marks a session cookie
    #[serde(default = "session_expiry")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

const fn session_expiry() -> f64 {
    -1.0
}

impl StoredCookie {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > 0.0 && self.expires <= now.timestamp() as f64
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        AUTH_COOKIE_NAMES.contains(&self.name.as_str())
    }

    fn to_spec(&self) -> CookieSpec {
        CookieSpec {
            name: self.name.clone(),
            value: self.value.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            expires: (self.expires > 0.0).then_some(self.expires),
            http_only: self.http_only,
            secure: self.secure,
            same_site: self.same_site.clone(),
        }
    }
}

/// Credential blob: cookies plus opaque per-origin storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    cookies: Vec<StoredCookie>,
    /// Local-storage entries, carried through untouched on save
    #[serde(default)]
    origins: Vec<serde_json::Value>,
    #[serde(skip)]
    source: String,
}

impl SessionState {
    /// Build an in-memory state; `source` names it in error messages.
    #[must_use]
    pub fn new(source: impl Into<String>, cookies: Vec<StoredCookie>) -> Self {
        Self {
            cookies,
            origins: Vec::new(),
            source: source.into(),
        }
    }

    /// Load the blob from disk.
    ///
    /// A missing or unparsable file is `SessionMissing`; expiry is checked
    /// separately by [`SessionState::ensure_fresh_at`].
    pub fn load(path: &Path) -> ScrapeResult<Self> {
        let source = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| ScrapeError::SessionMissing {
            path: source.clone(),
            detail: e.to_string(),
        })?;
        Self::from_json(&raw, source)
    }

    pub fn from_json(raw: &str, source: impl Into<String>) -> ScrapeResult<Self> {
        let source = source.into();
        let mut state: Self =
            serde_json::from_str(raw).map_err(|e| ScrapeError::SessionMissing {
                path: source.clone(),
                detail: format!("unreadable session file: {e}"),
            })?;
        debug!(cookies = state.cookies.len(), "Loaded session from {source}");
        state.source = source;
        Ok(state)
    }

    /// Write the blob back, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ScrapeResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ScrapeError::Config(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ScrapeError::Config(format!("serialize session: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| ScrapeError::Config(format!("{}: {e}", path.display())))
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn cookies(&self) -> &[StoredCookie] {
        &self.cookies
    }

    /// Fail unless at least one authentication cookie is unexpired at `now`.
    pub fn ensure_fresh_at(&self, now: DateTime<Utc>) -> ScrapeResult<()> {
        if self.cookies.is_empty() {
            return Err(ScrapeError::SessionMissing {
                path: self.source.clone(),
                detail: "no cookies stored".to_string(),
            });
        }

        let auth: Vec<&StoredCookie> = self.cookies.iter().filter(|c| c.is_auth()).collect();
        if auth.is_empty() {
            return Err(ScrapeError::SessionExpired {
                path: self.source.clone(),
                detail: format!("no {} cookie present", AUTH_COOKIE_NAMES.join("/")),
            });
        }
        if auth.iter().all(|c| c.is_expired_at(now)) {
            return Err(ScrapeError::SessionExpired {
                path: self.source.clone(),
                detail: format!("authentication cookies expired before {}", now.to_rfc3339()),
            });
        }
        Ok(())
    }

    pub fn ensure_fresh(&self) -> ScrapeResult<()> {
        self.ensure_fresh_at(Utc::now())
    }

    /// Cookies still valid at `now`, ready for installation into a page.
    #[must_use]
    pub fn cookie_specs_at(&self, now: DateTime<Utc>) -> Vec<CookieSpec> {
        self.cookies
            .iter()
            .filter(|c| !c.is_expired_at(now))
            .map(StoredCookie::to_spec)
            .collect()
    }
}
