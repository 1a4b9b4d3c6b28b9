use std::path::PathBuf;
use thiserror::Error;

use crate::model::{CleanupOutcome, CleanupProgress};

/// Errors a discoverer or the scan aggregator can produce.
///
/// Only `Canceled` escapes a scan; the aggregator turns everything else
/// into a policy warning and moves on.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan canceled")]
    Canceled,

    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Discoverer(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

/// What a canceled cleanup managed to finish before it stopped
#[derive(Debug, Clone, Default)]
pub struct CanceledCleanup {
    /// Outcomes for items that reached a terminal state, in selection order
    pub outcomes: Vec<CleanupOutcome>,
    pub progress: CleanupProgress,
}

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("cleanup canceled after {}/{} processed", .0.progress.processed, .0.progress.total)]
    Canceled(CanceledCleanup),

    #[error("failed to start cleanup workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
