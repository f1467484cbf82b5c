//! Custom error types for the dashboard generator.

use std::path::PathBuf;

use thiserror::Error;

/// Dashboard generation errors.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Stats(#[from] activity_stats::StatsError),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
