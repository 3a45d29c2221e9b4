use anyhow::{Context, Result, bail};

use crate::ui::prelude::{Level, emit};

use super::cli::InspectArgs;
use super::config::{CutConfig, WorkLayout};
use super::ffmpeg::{self, Ffmpeg, MediaTools};
use super::pipeline::ensure_audio_artifact;
use super::plan::{plan_keep_segments, touches_end};
use super::timestamp::{Rounding, clock_timestamp};

/// Analyze one file and print what a run would cut, without cutting.
pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    ffmpeg::ensure_tools()?;

    let mut config = CutConfig::load()?;
    config.apply_overrides(&args.tunables);

    if !args.video.is_file() {
        bail!("{} is not a file", args.video.display());
    }
    let root = args
        .video
        .parent()
        .with_context(|| format!("{} has no parent directory", args.video.display()))?
        .to_path_buf();
    let layout = WorkLayout::new(&root, args.temp_dir, None);

    let tools = Ffmpeg;
    let audio = ensure_audio_artifact(&args.video, &layout, &tools)?;
    let duration_seconds = tools.probe_duration_seconds(&audio)?;
    let silences = tools.detect_silence(
        &audio,
        duration_seconds,
        config.min_silence_ms,
        config.silence_threshold_db,
    )?;

    let duration_ms = (duration_seconds * 1000.0).round() as i64;
    emit(
        Level::Info,
        "cut.inspect.duration",
        &format!(
            "{} runs {}",
            args.video.display(),
            clock_timestamp(duration_ms, Rounding::Floor, true)?
        ),
        None,
    );

    if silences.is_empty() {
        emit(
            Level::Success,
            "cut.inspect.none",
            "No silences detected, nothing would be cut",
            None,
        );
        return Ok(());
    }

    for span in &silences {
        emit(
            Level::Info,
            "cut.inspect.silence",
            &format!(
                "Silence from {} to {}",
                describe_edge(span.start_ms, Rounding::Floor, span.touches_start(), "start of file"),
                describe_edge(
                    span.end_ms,
                    Rounding::Ceil,
                    touches_end(span.end_ms, duration_seconds),
                    "end of file"
                ),
            ),
            None,
        );
    }

    let plan = plan_keep_segments(duration_seconds, &silences)?;
    emit(
        Level::Info,
        "cut.inspect.plan",
        &format!("Would keep {} segment(s):", plan.keep.len()),
        None,
    );
    for segment in &plan.keep {
        emit(
            Level::Info,
            "cut.inspect.keep",
            &format!(
                "  {} -> {}",
                clock_timestamp(segment.start_ms, Rounding::Floor, true)?,
                clock_timestamp(segment.end_ms, Rounding::Ceil, true)?,
            ),
            None,
        );
    }

    Ok(())
}

fn describe_edge(offset_ms: i64, rounding: Rounding, at_boundary: bool, label: &str) -> String {
    if at_boundary {
        return label.to_string();
    }
    clock_timestamp(offset_ms, rounding, true).unwrap_or_else(|_| "??:??:??".to_string())
}
