use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::ui::prelude::{Level, emit};

use super::cli::RunArgs;
use super::config::{CutConfig, WorkLayout};
use super::discover::find_video_files;
use super::ffmpeg::{self, Ffmpeg, MediaTools};
use super::plan::{SilenceSpan, plan_keep_segments};
use super::reconstruct::{Reconstruction, reconstruct};
use super::report::ReportSink;

/// Result of processing one video, consumed by the report and dropped.
#[derive(Debug)]
pub enum FileOutcome {
    Success {
        output: PathBuf,
        removed: Vec<SilenceSpan>,
        duration_seconds: f64,
    },
    NothingToDo,
    Skipped {
        output: PathBuf,
    },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn handle_run(args: RunArgs) -> Result<()> {
    ffmpeg::ensure_tools()?;

    let mut config = CutConfig::load()?;
    config.apply_overrides(&args.tunables);

    if !args.root.is_dir() {
        bail!("{} is not a directory", args.root.display());
    }
    let layout = WorkLayout::new(&args.root, args.temp_dir, args.out_dir);
    layout.prepare()?;

    let videos = find_video_files(&layout, &config.video_extensions);
    if videos.is_empty() {
        emit(
            Level::Warn,
            "cut.run.empty",
            &format!("No video files found under {}", args.root.display()),
            None,
        );
        return Ok(());
    }
    emit(
        Level::Info,
        "cut.run.found",
        &format!("Found {} video file(s)", videos.len()),
        None,
    );

    let report_path = args.log_file.unwrap_or_else(ReportSink::default_path);
    let mut report = ReportSink::create(&report_path)?;

    let summary = run_batch(&videos, &config, &layout, &Ffmpeg, &mut report);

    emit(
        if summary.failed == 0 {
            Level::Success
        } else {
            Level::Warn
        },
        "cut.run.done",
        &format!(
            "Processed {} file(s): {} trimmed, {} unchanged, {} skipped, {} failed (report: {})",
            videos.len(),
            summary.succeeded,
            summary.unchanged,
            summary.skipped,
            summary.failed,
            report.path().display()
        ),
        None,
    );

    Ok(())
}

/// Process every video in order. A failing file becomes a Failure record and
/// the batch moves on; nothing aborts the loop.
pub fn run_batch(
    videos: &[PathBuf],
    config: &CutConfig,
    layout: &WorkLayout,
    tools: &dyn MediaTools,
    report: &mut ReportSink,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for video in videos {
        emit(
            Level::Info,
            "cut.file",
            &format!("Processing {}", video.display()),
            None,
        );
        match process_video(video, config, layout, tools) {
            Ok(FileOutcome::Success {
                output,
                removed,
                duration_seconds,
            }) => {
                report.success(video, &output, &removed, duration_seconds);
                summary.succeeded += 1;
            }
            Ok(FileOutcome::NothingToDo) => {
                report.nothing_to_do(video);
                summary.unchanged += 1;
            }
            Ok(FileOutcome::Skipped { output }) => {
                emit(
                    Level::Info,
                    "cut.file.skip",
                    &format!("{} already exists, skipping", output.display()),
                    None,
                );
                report.skipped(video, &output);
                summary.skipped += 1;
            }
            Err(error) => {
                emit(
                    Level::Error,
                    "cut.file.failed",
                    &format!("Failed to process {}: {error:#}", video.display()),
                    None,
                );
                report.failure(video, &error);
                summary.failed += 1;
            }
        }
    }

    summary
}

pub fn process_video(
    video: &Path,
    config: &CutConfig,
    layout: &WorkLayout,
    tools: &dyn MediaTools,
) -> Result<FileOutcome> {
    let audio = ensure_audio_artifact(video, layout, tools)?;
    let duration_seconds = tools.probe_duration_seconds(&audio)?;
    let silences = tools.detect_silence(
        &audio,
        duration_seconds,
        config.min_silence_ms,
        config.silence_threshold_db,
    )?;

    emit(
        Level::Debug,
        "cut.detect",
        &format!(
            "{} silence span(s) in {}",
            silences.len(),
            video.display()
        ),
        None,
    );

    if silences.is_empty() {
        return Ok(FileOutcome::NothingToDo);
    }

    let plan = plan_keep_segments(duration_seconds, &silences)?;
    match reconstruct(tools, layout, video, &plan.keep)? {
        Reconstruction::Skipped(output) => Ok(FileOutcome::Skipped { output }),
        Reconstruction::Built(output) => Ok(FileOutcome::Success {
            output,
            removed: plan.removed,
            duration_seconds,
        }),
    }
}

/// Reuse the audio artifact from an earlier run when it exists, extract it
/// otherwise.
pub fn ensure_audio_artifact(
    video: &Path,
    layout: &WorkLayout,
    tools: &dyn MediaTools,
) -> Result<PathBuf> {
    let audio = layout.audio_artifact(video);
    if audio.is_file() {
        return Ok(audio);
    }
    if let Some(parent) = audio.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create audio directory {}", parent.display()))?;
    }
    tools.extract_audio(video, &audio)?;
    Ok(audio)
}
