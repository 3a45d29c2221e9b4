use thiserror::Error;

/// Errors that abort processing of a single video without aborting the batch.
#[derive(Error, Debug)]
pub enum CutError {
    #[error("negative timestamp offset: {0} ms")]
    InvalidTimestamp(i64),

    #[error("keep segment {start_ms}..{end_ms} ms has no length; silence list is malformed")]
    EmptySegment { start_ms: i64, end_ms: i64 },

    #[error("media is silent from start to end, nothing would remain after cutting")]
    NothingToKeep,
}
