//! Automation-fingerprint suppression
//!
//! [`configure`] is a pure transformation of [`LaunchOptions`]; [`apply`]
//! pushes the resulting scripts and user-agent override into a live page.

use anyhow::Result;
use chromiumoxide::{Page, cdp};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

mod profile;
pub use profile::StealthProfile;

use crate::config::ScrapeConfig;
use crate::utils::constants::CHROME_USER_AGENT;

/// Blink flag that removes the automation-controlled infobar and JS hooks
pub const AUTOMATION_FLAG: &str = "--disable-blink-features=AutomationControlled";

/// Hides `navigator.webdriver` so it reads as absent rather than `false`
pub const WEBDRIVER_SCRIPT: &str = r"
Object.defineProperty(Navigator.prototype, 'webdriver', {
    get: () => undefined,
    configurable: true
});
";

/// Everything needed to start the browsing engine
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: Option<String>,
    pub args: Vec<String>,
    /// Scripts registered to run before any page script, in order
    pub init_scripts: Vec<String>,
    pub chrome_executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub profile: StealthProfile,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        let profile = StealthProfile::default();
        Self {
            headless: true,
            window_size: (profile.screen_width, profile.screen_height),
            user_agent: None,
            args: base_args(),
            init_scripts: Vec::new(),
            chrome_executable: None,
            user_data_dir: None,
            request_timeout: Duration::from_secs(30),
            profile,
        }
    }
}

impl LaunchOptions {
    /// Unconfigured options derived from the run configuration.
    #[must_use]
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            headless: config.headless(),
            chrome_executable: config.chrome_executable().cloned(),
            user_data_dir: config.user_data_dir().cloned(),
            request_timeout: config.navigation_timeout(),
            ..Self::default()
        }
    }
}

fn base_args() -> Vec<String> {
    [
        "--no-first-run",
        "--no-default-browser-check",
        "--disable-infobars",
        "--disable-notifications",
        "--disable-popup-blocking",
        "--disable-background-timer-throttling",
        "--disable-backgrounding-occluded-windows",
        "--disable-features=TranslateUI",
        "--password-store=basic",
        "--use-mock-keychain",
        "--mute-audio",
    ]
    .iter()
    .map(|arg| (*arg).to_string())
    .collect()
}

/// Harden launch options against automation detection.
///
/// Idempotent: applying it twice yields the same options.
#[must_use]
pub fn configure(mut options: LaunchOptions) -> LaunchOptions {
    if !options.args.iter().any(|arg| arg == AUTOMATION_FLAG) {
        options.args.push(AUTOMATION_FLAG.to_string());
    }

    let needs_agent = options
        .user_agent
        .as_deref()
        .is_none_or(|ua| ua.trim().is_empty() || ua.contains("Headless"));
    if needs_agent {
        options.user_agent = Some(CHROME_USER_AGENT.to_string());
    }

    if !options.init_scripts.iter().any(|s| s == WEBDRIVER_SCRIPT) {
        options.init_scripts.insert(0, WEBDRIVER_SCRIPT.to_string());
    }
    let navigator = options.profile.navigator_script();
    if !options.init_scripts.contains(&navigator) {
        options.init_scripts.push(navigator);
    }

    options
}

/// Register init scripts and the user-agent override on `page`.
///
/// Script registration is best-effort; the call only fails when no script
/// could be registered or the user-agent override is rejected.
pub async fn apply(page: &Page, options: &LaunchOptions) -> Result<()> {
    debug!("Registering {} init scripts", options.init_scripts.len());

    let mut registered = 0usize;
    for (index, source) in options.init_scripts.iter().enumerate() {
        let result = page
            .execute(
                cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
                    source: source.clone(),
                    include_command_line_api: None,
                    world_name: None,
                    run_immediately: None,
                },
            )
            .await;
        match result {
            Ok(_) => registered += 1,
            Err(e) => warn!("Failed to register init script #{index}: {e}"),
        }
    }

    if registered == 0 && !options.init_scripts.is_empty() {
        return Err(anyhow::anyhow!(
            "Failed to register any of {} init scripts",
            options.init_scripts.len()
        ));
    }

    let user_agent = match &options.user_agent {
        Some(ua) => ua.clone(),
        None => {
            let version = page
                .execute(cdp::browser_protocol::browser::GetVersionParams {})
                .await?;
            version.user_agent.replace("Headless", "")
        }
    };

    page.execute(cdp::browser_protocol::network::SetUserAgentOverrideParams {
        user_agent,
        accept_language: Some(options.profile.accept_language.clone()),
        platform: Some(options.profile.platform.clone()),
        user_agent_metadata: None,
    })
    .await?;

    debug!(
        "Stealth setup complete: {registered}/{} scripts active",
        options.init_scripts.len()
    );
    Ok(())
}
