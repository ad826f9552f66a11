use serde::{Deserialize, Serialize};
use std::fmt;

/// Why one item could not be removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum RemovalFailureReason {
    /// No anchor for the item after reloading and scrolling the list
    NotFound,
    /// No enclosing item card around the anchor
    CardNotResolved,
    /// No save/bookmark/list control inside the card
    ControlNotFound,
    /// The list picker overlay never appeared after the click
    PickerNotOpened,
    /// The picker had no row for the list
    ListRowNotFound,
    /// The list's row did not show the item as saved, so it was left alone
    RowNotChecked,
    /// The browser failed mid-sequence
    InteractionFailed(String),
}

impl fmt::Display for RemovalFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("not-found"),
            Self::CardNotResolved => f.write_str("card-not-resolved"),
            Self::ControlNotFound => f.write_str("control-not-found"),
            Self::PickerNotOpened => f.write_str("picker-not-opened"),
            Self::ListRowNotFound => f.write_str("list-row-not-found"),
            Self::RowNotChecked => f.write_str("row-not-checked"),
            Self::InteractionFailed(detail) => write!(f, "interaction-failed: {detail}"),
        }
    }
}

/// Result for one target, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    pub target: String,
    pub succeeded: bool,
    #[serde(flatten)]
    pub reason: Option<RemovalFailureReason>,
}

impl RemovalOutcome {
    #[must_use]
    pub fn success(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            succeeded: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn failure(target: impl Into<String>, reason: RemovalFailureReason) -> Self {
        Self {
            target: target.into(),
            succeeded: false,
            reason: Some(reason),
        }
    }
}

/// Success/failure partition of a removal run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReport {
    pub succeeded: Vec<RemovalOutcome>,
    pub failed: Vec<RemovalOutcome>,
}

impl RemovalReport {
    pub(crate) fn record(&mut self, outcome: RemovalOutcome) {
        if outcome.succeeded {
            self.succeeded.push(outcome);
        } else {
            self.failed.push(outcome);
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}
