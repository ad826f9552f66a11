//! Credentials and the authenticated browsing context

mod context;
mod state;

pub use context::BrowsingContext;
pub use state::{AUTH_COOKIE_NAMES, SessionState, StoredCookie};
