use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};

use crate::ui::prelude::{Level, emit};

use super::config::WorkLayout;
use super::ffmpeg::MediaTools;
use super::plan::KeepSegment;
use super::timestamp::{Rounding, clock_timestamp};

/// What the orchestrator did for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconstruction {
    /// The trimmed video was written to this path.
    Built(PathBuf),
    /// The output already existed; nothing was invoked.
    Skipped(PathBuf),
}

/// Rebuild a video from its keep segments.
///
/// One segment is trimmed straight into the final output. More than one are
/// extracted into indexed intermediate clips and joined with a stream-copy
/// concat; the intermediates are removed after a successful join and kept
/// around when the join fails.
pub fn reconstruct(
    tools: &dyn MediaTools,
    layout: &WorkLayout,
    source: &Path,
    segments: &[KeepSegment],
) -> Result<Reconstruction> {
    ensure!(
        !segments.is_empty(),
        "reconstruct called with no keep segments for {}",
        source.display()
    );

    let output = layout.output_file(source);
    if output.exists() {
        return Ok(Reconstruction::Skipped(output));
    }
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    if let [only] = segments {
        let (start, end) = cut_points(only)?;
        tools.extract_segment(source, &start, &end, &output)?;
        return Ok(Reconstruction::Built(output));
    }

    let mut clips = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        let clip = layout.intermediate(source, index);
        if let Some(parent) = clip.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create intermediate directory {}", parent.display())
            })?;
        }
        let (start, end) = cut_points(segment)?;
        tools.extract_segment(source, &start, &end, &clip)?;
        clips.push(clip);
    }

    tools.concat_segments(&clips, &output)?;

    for clip in &clips {
        if let Err(error) = fs::remove_file(clip) {
            emit(
                Level::Warn,
                "cut.cleanup",
                &format!("Failed to remove intermediate {}: {error}", clip.display()),
                None,
            );
        }
    }

    Ok(Reconstruction::Built(output))
}

fn cut_points(segment: &KeepSegment) -> Result<(String, String)> {
    // Hours included so media longer than an hour cuts at the right offsets
    let start = clock_timestamp(segment.start_ms, Rounding::Floor, true)?;
    let end = clock_timestamp(segment.end_ms, Rounding::Ceil, true)?;
    Ok((start, end))
}
