use crate::browser::PageDriver;
use crate::error::ScrapeResult;

use super::SessionState;

/// Authenticated browsing context: one live page plus its credentials
///
/// Shared by reference across the navigator, extractor, harvester and
/// automator of one logical operation.
pub struct BrowsingContext<D> {
    driver: D,
    session: SessionState,
}

impl<D: PageDriver> BrowsingContext<D> {
    /// Pair a driver with a session without touching the page.
    pub fn new(driver: D, session: SessionState) -> Self {
        Self { driver, session }
    }

    /// Validate the session and install its cookies into the page.
    pub async fn establish(driver: D, session: SessionState) -> ScrapeResult<Self> {
        session.ensure_fresh()?;
        driver
            .install_cookies(&session.cookie_specs_at(chrono::Utc::now()))
            .await?;
        Ok(Self { driver, session })
    }

    /// Fails with `SessionMissing`/`SessionExpired` before any DOM work.
    pub fn ensure_valid(&self) -> ScrapeResult<()> {
        self.session.ensure_fresh()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}
