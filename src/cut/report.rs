use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::ui::prelude::{Level, emit};

use super::plan::SilenceSpan;
use super::timestamp::{Rounding, clock_timestamp};

const RECORD_RULE: &str = "#########################";

/// Append-only per-batch report file. One sink is opened per run and every
/// processed file appends exactly one record. Write failures are demoted to
/// console warnings so a broken report can never fail a file that cut fine.
pub struct ReportSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(format!(
            "quietcut_{}.log",
            Local::now().format("%Y%m%d_%H%M")
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn success(
        &mut self,
        input: &Path,
        output: &Path,
        removed: &[SilenceSpan],
        duration_seconds: f64,
    ) {
        let duration_ms = (duration_seconds * 1000.0).round() as i64;
        let removed_ms: i64 = removed.iter().map(SilenceSpan::duration_ms).sum();
        let cuts = removed
            .iter()
            .filter(|span| span.duration_ms() > 0)
            .map(format_cut)
            .collect::<Vec<_>>()
            .join(", ");

        self.write_record(&format!(
            " Successfully processed {input}\n  \
             Written to {output}\n  \
             Input duration : {total}\n  \
             Silence cuts : {cuts}\n  \
             Output duration : {remaining}",
            input = input.display(),
            output = output.display(),
            total = clock_or_placeholder(duration_ms, Rounding::Floor),
            remaining = clock_or_placeholder(duration_ms - removed_ms, Rounding::Floor),
        ));
    }

    pub fn nothing_to_do(&mut self, input: &Path) {
        self.write_record(&format!(" Nothing to do for {}", input.display()));
    }

    pub fn skipped(&mut self, input: &Path, output: &Path) {
        self.write_record(&format!(
            " {} already exists, skipped {}",
            output.display(),
            input.display()
        ));
    }

    pub fn failure(&mut self, input: &Path, error: &anyhow::Error) {
        self.write_record(&format!(
            " Issue while processing {}\n{error:#}",
            input.display()
        ));
    }

    fn write_record(&mut self, content: &str) {
        let written = writeln!(self.writer, "{RECORD_RULE}\n{content}\n{RECORD_RULE}")
            .and_then(|_| self.writer.flush());
        if let Err(error) = written {
            emit(
                Level::Warn,
                "cut.report",
                &format!(
                    "Failed to write report record to {}: {error}",
                    self.path.display()
                ),
                None,
            );
        }
    }
}

/// `MM:SS -> MM:SS`, start floored and end ceiled like the cut itself.
fn format_cut(span: &SilenceSpan) -> String {
    format!(
        "{} -> {}",
        clock_timestamp(span.start_ms, Rounding::Floor, false)
            .unwrap_or_else(|_| "??:??".to_string()),
        clock_timestamp(span.end_ms, Rounding::Ceil, false).unwrap_or_else(|_| "??:??".to_string()),
    )
}

fn clock_or_placeholder(offset_ms: i64, rounding: Rounding) -> String {
    clock_timestamp(offset_ms, rounding, true).unwrap_or_else(|_| "??:??:??".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sink(dir: &tempfile::TempDir) -> ReportSink {
        ReportSink::create(&dir.path().join("report.log")).unwrap()
    }

    fn contents(sink: ReportSink) -> String {
        let path = sink.path().to_path_buf();
        drop(sink);
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn success_record_lists_cuts_and_durations() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(&dir);
        let removed = [
            SilenceSpan::new(0, 0),
            SilenceSpan::new(5000, 7000),
            SilenceSpan::new(20000, 20000),
        ];
        sink.success(
            Path::new("talk.mkv"),
            Path::new("out/talk.mkv"),
            &removed,
            20.0,
        );

        let report = contents(sink);
        assert!(report.contains("Successfully processed talk.mkv"));
        assert!(report.contains("Written to out/talk.mkv"));
        assert!(report.contains("Input duration : 00:00:20"));
        // Zero-length boundary sentinels are not cuts
        assert!(report.contains("Silence cuts : 00:05 -> 00:07"));
        assert!(report.contains("Output duration : 00:00:18"));
    }

    #[test]
    fn records_are_framed_by_rules() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(&dir);
        sink.nothing_to_do(Path::new("quiet.mkv"));

        let report = contents(sink);
        assert_eq!(
            report,
            format!("{RECORD_RULE}\n Nothing to do for quiet.mkv\n{RECORD_RULE}\n")
        );
    }

    #[test]
    fn skip_and_failure_records_name_the_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(&dir);
        sink.skipped(Path::new("a.mkv"), Path::new("out/a.mkv"));
        sink.failure(
            Path::new("b.mkv"),
            &anyhow::anyhow!("ffmpeg failed to extract audio"),
        );

        let report = contents(sink);
        assert!(report.contains("out/a.mkv already exists, skipped a.mkv"));
        assert!(report.contains("Issue while processing b.mkv"));
        assert!(report.contains("ffmpeg failed to extract audio"));
    }

    #[test]
    fn multiple_cuts_are_comma_joined() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(&dir);
        let removed = [SilenceSpan::new(5000, 7000), SilenceSpan::new(10000, 12500)];
        sink.success(Path::new("t.mkv"), Path::new("out/t.mkv"), &removed, 30.0);

        let report = contents(sink);
        assert!(report.contains("Silence cuts : 00:05 -> 00:07, 00:10 -> 00:13"));
        assert!(report.contains("Output duration : 00:00:25"));
    }
}
