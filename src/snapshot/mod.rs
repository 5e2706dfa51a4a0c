//! Finance snapshot derivation.
//!
//! Reads the finance tracker's JSON blob and reduces it to a compact
//! [`FinanceSnapshot`] suitable for sharing with the model. The tracker file
//! is not owned by this crate and is treated as untrusted: every failure
//! degrades to "no snapshot" instead of an error.

pub mod coerce;
mod derive;
mod models;

pub use derive::{
    derive_snapshot, snapshot_from_json, sum_amounts, IsaProjection, DEFAULT_CURRENCY,
    MAX_RECENT_DAYS,
};
pub use models::{DayResult, FinanceSnapshot, IsaSummary, SnapshotSettings, SnapshotTotals};

use std::fmt;
use std::path::Path;

use tokio::fs;
use tracing::warn;

/// Loads and derives a snapshot from the tracker file at `path`.
///
/// A missing or unreadable file yields `None`.
pub async fn load_snapshot(path: &Path) -> Option<FinanceSnapshot> {
    match fs::read_to_string(path).await {
        Ok(raw) => snapshot_from_json(&raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read finance data");
            None
        }
    }
}

/// Whether finance data is available to share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    Detected { currency: String },
    Missing,
}

impl SnapshotStatus {
    pub fn of(snapshot: Option<&FinanceSnapshot>) -> Self {
        match snapshot {
            Some(s) => Self::Detected {
                currency: s.currency.clone(),
            },
            None => Self::Missing,
        }
    }
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detected { currency } => write!(f, "Data detected • {currency}"),
            Self::Missing => f.write_str("No finance data found"),
        }
    }
}
