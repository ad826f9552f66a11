//! Browser discovery, launch and the single-page session
//!
//! Everything above this module talks to [`PageDriver`]; chromiumoxide types
//! stay behind [`ChromiumDriver`] and [`BrowserSession`].

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

pub mod chromium;
pub mod driver;
pub mod js_scripts;
pub mod page_timeout;

pub use chromium::ChromiumDriver;
pub use driver::{CookieSpec, Located, Locator, Navigation, PageDriver, Point, wait_for};
pub use page_timeout::{with_page_timeout, within};

use crate::config::ScrapeConfig;
use crate::stealth::{self, LaunchOptions};

/// Find Chrome/Chromium on the system.
///
/// `CHROMIUM_PATH` wins, then well-known install locations, then `which`.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using CHROMIUM_PATH browser: {}", path.display());
            return Ok(path);
        }
        warn!("Ignoring CHROMIUM_PATH, no such file: {}", path.display());
    }

    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in paths {
        let path = if let Some(rest) = candidate.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else {
            PathBuf::from(candidate)
        };
        if path.exists() {
            info!("Using installed browser: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Using browser from PATH: {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mediumscrape")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );
    Ok(revision_info.executable_path)
}

/// Resolve the executable: explicit option, local install, then download.
async fn resolve_executable(options: &LaunchOptions) -> Result<PathBuf> {
    if let Some(path) = &options.chrome_executable {
        return Ok(path.clone());
    }
    match find_browser_executable() {
        Ok(path) => Ok(path),
        Err(e) => {
            warn!("{e}. Falling back to managed download.");
            download_managed_browser().await
        }
    }
}

/// Launch the engine with `options` (already passed through [`stealth::configure`]).
pub async fn launch(options: &LaunchOptions) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = resolve_executable(options).await?;

    let user_data_dir = options.user_data_dir.clone().unwrap_or_else(|| {
        std::env::temp_dir().join(format!("mediumscrape_chrome_{}", std::process::id()))
    });
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let (width, height) = options.window_size;
    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(options.request_timeout)
        .window_size(width, height)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    config_builder = if options.headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    if let Some(ua) = &options.user_agent {
        config_builder = config_builder.arg(format!("--user-agent={ua}"));
    }
    for arg in &options.args {
        config_builder = config_builder.arg(arg.as_str());
    }

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!(headless = options.headless, "Launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let error_msg = e.to_string();
                // chromiumoxide cannot decode some newer CDP events; those are noise
                let is_benign_serialization_error = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");

                if is_benign_serialization_error {
                    trace!("Suppressed benign CDP serialization error: {error_msg}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}

/// One browser, its CDP handler task and the single working page
///
/// Dropping the session aborts the handler; call [`BrowserSession::close`]
/// for an orderly shutdown.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    driver: ChromiumDriver,
}

impl BrowserSession {
    /// Launch a stealth-configured browser and open the working page.
    pub async fn launch(config: &ScrapeConfig) -> Result<Self> {
        let options = stealth::configure(LaunchOptions::from_config(config));
        let (browser, handler) = launch(&options).await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e).context("Failed to open working page");
            }
        };
        if let Err(e) = stealth::apply(&page, &options).await {
            warn!("Stealth setup incomplete: {e:#}");
        }

        Ok(Self {
            browser,
            handler,
            driver: ChromiumDriver::new(page, config.navigation_timeout()),
        })
    }

    #[must_use]
    pub fn driver(&self) -> ChromiumDriver {
        self.driver.clone()
    }

    /// Close the browser and wait for the handler to finish.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {e}");
        }
        self.handler.abort();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
