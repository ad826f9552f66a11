//! Scroll-to-exhaustion for infinitely loading lists

use tracing::{debug, info};

use crate::browser::PageDriver;
use crate::config::ScrapeConfig;
use crate::error::ScrapeResult;

/// How a scroll loop ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOutcome {
    /// Scroll-and-measure cycles performed
    pub iterations: u32,
    pub final_height: f64,
    /// False when the iteration cap stopped the loop first
    pub exhausted: bool,
}

/// Scroll to the bottom until the document stops growing.
///
/// Each iteration scrolls to the current height, waits the settle delay and
/// measures again. The loop ends on the first measurement that does not
/// exceed the previous one, or after `max_scroll_iterations`.
pub async fn scroll_to_exhaustion<D>(driver: &D, config: &ScrapeConfig) -> ScrapeResult<ScrollOutcome>
where
    D: PageDriver + ?Sized,
{
    let cap = config.max_scroll_iterations();
    let mut previous = driver.scroll_height().await?;

    for iteration in 1..=cap {
        driver.scroll_to(previous).await?;
        tokio::time::sleep(config.scroll_settle()).await;
        let height = driver.scroll_height().await?;
        debug!(iteration, previous, height, "Scroll iteration");

        if height <= previous {
            info!("List exhausted after {iteration} scroll iterations (height {height})");
            return Ok(ScrollOutcome {
                iterations: iteration,
                final_height: height,
                exhausted: true,
            });
        }
        previous = height;
    }

    info!("Scroll cap of {cap} iterations reached (height {previous})");
    Ok(ScrollOutcome {
        iterations: cap,
        final_height: previous,
        exhausted: false,
    })
}
