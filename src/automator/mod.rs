//! Scripted removal of items from a list
//!
//! Each target is handled independently through a fixed sequence: reload
//! and scroll the list, find the item's anchor, resolve its card, reveal
//! it, click the save control, wait for the list picker, toggle the list's
//! row off and dismiss the picker. The row is only clicked while it shows
//! the item as saved, since clicking an unchecked row would add the item. Per-item failures are recorded and the run
//! continues; only session failures abort it. Nothing is retried.

use tracing::{info, warn};

mod outcome;

pub use outcome::{RemovalFailureReason, RemovalOutcome, RemovalReport};

use crate::browser::{Located, Locator, PageDriver, Point, wait_for};
use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::harvester::{open_list, resolve_list_url};
use crate::session::BrowsingContext;
use crate::utils::url_utils::normalize_path;

/// Case-insensitive fragments identifying the save-to-list control
pub const CONTROL_KEYWORDS: &[&str] = &["save", "bookmark", "list", "add to"];

/// Failure of one step: fatal for the run, or just for the item
enum StepError {
    Fatal(ScrapeError),
    Item(RemovalFailureReason),
}

impl From<anyhow::Error> for StepError {
    fn from(err: anyhow::Error) -> Self {
        Self::Item(RemovalFailureReason::InteractionFailed(format!("{err:#}")))
    }
}

impl From<ScrapeError> for StepError {
    fn from(err: ScrapeError) -> Self {
        if err.is_session_error() {
            Self::Fatal(err)
        } else {
            Self::Item(RemovalFailureReason::InteractionFailed(err.to_string()))
        }
    }
}

type StepResult<T> = Result<T, StepError>;

fn require<T>(found: Option<T>, reason: RemovalFailureReason) -> StepResult<T> {
    found.ok_or(StepError::Item(reason))
}

/// Remove every target from the list named `list_label`.
///
/// Targets are item URLs or paths. The list must be reachable once up
/// front; afterwards each target succeeds or fails on its own.
pub async fn remove_all<D>(
    context: &BrowsingContext<D>,
    list_label: &str,
    targets: &[String],
    config: &ScrapeConfig,
) -> ScrapeResult<RemovalReport>
where
    D: PageDriver,
{
    let list_url = resolve_list_url(context, list_label, config).await?;
    open_list(context, &list_url, config).await?;

    let mut report = RemovalReport::default();
    for target in targets {
        let Some(path) = normalize_path(&list_url, target) else {
            warn!("Skipping unparsable target '{target}'");
            report.record(RemovalOutcome::failure(target.as_str(), RemovalFailureReason::NotFound));
            continue;
        };

        let outcome = match remove_one(context, &list_url, list_label, &path, config).await {
            Ok(()) => {
                info!("Removed {target} from '{list_label}'");
                RemovalOutcome::success(target.as_str())
            }
            Err(StepError::Item(reason)) => {
                warn!("Could not remove {target}: {reason}");
                RemovalOutcome::failure(target.as_str(), reason)
            }
            Err(StepError::Fatal(err)) => return Err(err),
        };
        report.record(outcome);
    }

    info!(
        "Removal finished: {} succeeded, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn remove_one<D>(
    context: &BrowsingContext<D>,
    list_url: &str,
    list_label: &str,
    path: &str,
    config: &ScrapeConfig,
) -> StepResult<()>
where
    D: PageDriver,
{
    let document = open_list(context, list_url, config).await?;
    let driver = document.driver();

    let anchor = require(
        driver
            .locate(&Locator::Anchor {
                path: path.to_string(),
            })
            .await?,
        RemovalFailureReason::NotFound,
    )?;

    let card = require(
        driver
            .locate(&Locator::Card {
                anchor: anchor.key.clone(),
            })
            .await?,
        RemovalFailureReason::CardNotResolved,
    )?;
    driver.scroll_into_view(&card).await?;

    let control = require(
        driver
            .locate(&Locator::Control {
                card: card.key.clone(),
                keywords: CONTROL_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            })
            .await?,
        RemovalFailureReason::ControlNotFound,
    )?;
    let point = click_point(driver, &control).await?;
    driver.click(point).await?;

    let overlay = require(
        wait_for(
            driver,
            &Locator::Overlay,
            config.overlay_timeout(),
            config.poll_interval(),
        )
        .await?,
        RemovalFailureReason::PickerNotOpened,
    )?;

    let toggled = toggle_row(driver, &overlay, list_label, config).await;
    // The picker was opened, so it is always dismissed
    if let Err(e) = driver.press_escape().await {
        warn!("Failed to dismiss list picker: {e:#}");
    }
    toggled
}

async fn toggle_row<D>(
    driver: &D,
    overlay: &Located,
    list_label: &str,
    config: &ScrapeConfig,
) -> StepResult<()>
where
    D: PageDriver + ?Sized,
{
    let row = require(
        driver
            .locate(&Locator::PickerRow {
                overlay: overlay.key.clone(),
                label: list_label.to_string(),
            })
            .await?,
        RemovalFailureReason::ListRowNotFound,
    )?;
    if row.checked != Some(true) {
        return Err(StepError::Item(RemovalFailureReason::RowNotChecked));
    }
    let point = click_point(driver, &row).await?;
    driver.click(point).await?;
    tokio::time::sleep(config.post_click_wait()).await;
    Ok(())
}

/// Scroll `element` into view and return where to click it.
async fn click_point<D>(driver: &D, element: &Located) -> StepResult<Point>
where
    D: PageDriver + ?Sized,
{
    let refreshed = driver.scroll_into_view(element).await?;
    refreshed.or(element.center).ok_or_else(|| {
        StepError::Item(RemovalFailureReason::InteractionFailed(format!(
            "element {} has no layout box",
            element.key
        )))
    })
}
