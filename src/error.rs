//! Error taxonomy for training runs.

use thiserror::Error;

/// Errors raised while loading or saving genome snapshots.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// No snapshot exists under the requested label.
    #[error("genome snapshot not found: {path}")]
    NotFound {
        /// Path that was probed.
        path: String,
    },
    /// Filesystem failure while reading or writing a snapshot.
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot exists but is not a valid genome.
    #[error("snapshot is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Top-level failure modes of a training run.
///
/// There are no retries anywhere: a failed tick cannot be replayed without
/// corrupting fitness accounting, so evaluation failures are fatal.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Invalid configuration detected at startup, before any generation runs.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Snapshot load failure surfaced to the caller. Save failures are
    /// logged and swallowed instead.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    /// Training was cancelled cooperatively. The best-known genome has
    /// already been saved on a best-effort basis by the time this is raised.
    #[error("training interrupted")]
    Interrupted,
    /// Unexpected failure during a generation; mid-generation state is not
    /// resumable, so this aborts the whole run.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}
