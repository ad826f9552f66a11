//! Configuration module
//!
//! `ScrapeConfig` holds every timeout class, loop bound and path the crate
//! reads, with fluent setters and an environment overlay.

// Sub-modules
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use types::ScrapeConfig;
