pub mod automator;
pub mod browser;
pub mod config;
pub mod error;
pub mod extractor;
pub mod harvester;
pub mod navigator;
pub mod session;
pub mod stealth;
pub mod utils;

pub use automator::{RemovalFailureReason, RemovalOutcome, RemovalReport, remove_all};
pub use browser::{BrowserSession, ChromiumDriver, Located, Locator, PageDriver, Point};
pub use config::ScrapeConfig;
pub use error::{ScrapeError, ScrapeResult};
pub use extractor::{Article, ContentNode, InlineRun, extract, fetch_article, render_markdown};
pub use harvester::{CandidatePatterns, ListCandidate, harvest};
pub use navigator::{DocumentHandle, PageLoadResult, PageStatus, load};
pub use session::{BrowsingContext, SessionState};
pub use stealth::{LaunchOptions, configure};
