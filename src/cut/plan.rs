//! Turns detected silence spans into the ordered list of segments to keep.

use super::error::CutError;

/// Allowed gap in seconds between a detected silence edge and the true end of
/// the media before the silence counts as touching the end. Detection near the
/// tail of a track is imprecise by a second or two.
pub const END_TOLERANCE_SECS: f64 = 3.0;

/// A detected span of silence, in milliseconds from the start of the media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceSpan {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl SilenceSpan {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// A span touches the start only when it begins exactly at zero.
    pub fn touches_start(&self) -> bool {
        self.start_ms == 0
    }
}

/// A span of media to retain in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepSegment {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Whether a silence edge is close enough to the end of the media to be
/// treated as running to the end.
pub fn touches_end(end_ms: i64, duration_seconds: f64) -> bool {
    ((end_ms / 1000) as f64 - duration_seconds).abs() < END_TOLERANCE_SECS
}

/// The cut plan for one video: the segments to extract, and the normalized
/// silence spans they are separated by (what the report prints as removed).
#[derive(Debug, Clone)]
pub struct Plan {
    pub keep: Vec<KeepSegment>,
    pub removed: Vec<SilenceSpan>,
}

/// Derive the keep segments for a media file of `duration_seconds` from the
/// detector's ordered, non-overlapping silence spans.
///
/// The span list is normalized first: a `(0, 0)` sentinel is prepended unless
/// the media opens on silence, and a `(duration, duration)` sentinel is
/// appended unless the last silence already touches the end. Each gap between
/// consecutive normalized spans becomes one keep segment. Without the
/// sentinels a video opening or closing on silence would lose its first or
/// last segment.
///
/// Callers handle the no-silence case before planning; a single span covering
/// the whole file leaves nothing to keep and is an error, as is any
/// non-positive gap (malformed detector output).
pub fn plan_keep_segments(
    duration_seconds: f64,
    silences: &[SilenceSpan],
) -> Result<Plan, CutError> {
    let duration_ms = (duration_seconds * 1000.0).round() as i64;

    let mut spans = Vec::with_capacity(silences.len() + 2);
    if silences.first().is_none_or(|first| !first.touches_start()) {
        spans.push(SilenceSpan::new(0, 0));
    }
    spans.extend_from_slice(silences);
    if spans
        .last()
        .is_none_or(|last| !touches_end(last.end_ms, duration_seconds))
    {
        spans.push(SilenceSpan::new(duration_ms, duration_ms));
    }

    if spans.len() < 2 {
        return Err(CutError::NothingToKeep);
    }

    let mut keep = Vec::with_capacity(spans.len() - 1);
    for pair in spans.windows(2) {
        let segment = KeepSegment {
            start_ms: pair[0].end_ms,
            end_ms: pair[1].start_ms,
        };
        if segment.end_ms <= segment.start_ms {
            return Err(CutError::EmptySegment {
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
            });
        }
        keep.push(segment);
    }

    Ok(Plan {
        keep,
        removed: spans,
    })
}
