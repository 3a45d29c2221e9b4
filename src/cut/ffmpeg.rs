use anyhow::{Context, Result, bail};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use super::plan::SilenceSpan;

/// The external invocations one video needs: probing, audio extraction,
/// silence detection, and the two stream-copy transcoder requests. Everything
/// returns an explicit `Result` so callers never look at exit codes.
pub trait MediaTools {
    fn probe_duration_seconds(&self, path: &Path) -> Result<f64>;

    fn extract_audio(&self, input: &Path, output: &Path) -> Result<()>;

    fn detect_silence(
        &self,
        audio: &Path,
        duration_seconds: f64,
        min_silence_ms: i64,
        threshold_db: i32,
    ) -> Result<Vec<SilenceSpan>>;

    /// Stream-copy trim of `source` between two clock timestamps.
    fn extract_segment(
        &self,
        source: &Path,
        start_ts: &str,
        end_ts: &str,
        output: &Path,
    ) -> Result<()>;

    /// Stream-copy join of already extracted clips, in the given order.
    fn concat_segments(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Verify the ffmpeg tools are installed before starting a batch.
pub fn ensure_tools() -> Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        which::which(tool)
            .with_context(|| format!("{tool} not found on PATH; install ffmpeg to use quietcut"))?;
    }
    Ok(())
}

/// The real collaborators, invoked through the ffmpeg/ffprobe CLIs.
pub struct Ffmpeg;

impl MediaTools for Ffmpeg {
    fn probe_duration_seconds(&self, path: &Path) -> Result<f64> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .with_context(|| format!("Failed to run ffprobe for {}", path.display()))?;

        if !output.status.success() {
            bail!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let duration_str = String::from_utf8_lossy(&output.stdout);
        let duration: f64 = duration_str
            .trim()
            .parse()
            .context("Failed to parse ffprobe duration as f64")?;

        Ok(duration)
    }

    fn extract_audio(&self, input: &Path, output: &Path) -> Result<()> {
        let result = Command::new("ffmpeg")
            .args(["-y", "-nostdin", "-i"])
            .arg(input)
            .args(["-vn", "-map", "0:a:0", "-c:a", "libmp3lame", "-q:a", "2"])
            .arg(output)
            .output()
            .with_context(|| {
                format!(
                    "Failed to run ffmpeg to extract audio from {}",
                    input.display()
                )
            })?;

        if !result.status.success() {
            bail!(
                "ffmpeg failed to extract audio from {}: {}",
                input.display(),
                stderr_tail(&result.stderr)
            );
        }

        Ok(())
    }

    fn detect_silence(
        &self,
        audio: &Path,
        duration_seconds: f64,
        min_silence_ms: i64,
        threshold_db: i32,
    ) -> Result<Vec<SilenceSpan>> {
        let filter = format!(
            "silencedetect=noise={}dB:d={}",
            threshold_db,
            min_silence_ms as f64 / 1000.0
        );
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-nostdin", "-i"])
            .arg(audio)
            .args(["-af", &filter, "-f", "null", "-"])
            .output()
            .with_context(|| {
                format!(
                    "Failed to run ffmpeg silence detection on {}",
                    audio.display()
                )
            })?;

        if !output.status.success() {
            bail!(
                "ffmpeg silence detection failed on {}: {}",
                audio.display(),
                stderr_tail(&output.stderr)
            );
        }

        parse_silence_spans(&String::from_utf8_lossy(&output.stderr), duration_seconds)
    }

    fn extract_segment(
        &self,
        source: &Path,
        start_ts: &str,
        end_ts: &str,
        output: &Path,
    ) -> Result<()> {
        let result = Command::new("ffmpeg")
            .args(["-y", "-nostdin", "-i"])
            .arg(source)
            .args(["-ss", start_ts, "-to", end_ts, "-c:v", "copy", "-c:a", "copy"])
            .arg(output)
            .output()
            .with_context(|| format!("Failed to run ffmpeg to trim {}", source.display()))?;

        if !result.status.success() {
            bail!(
                "ffmpeg failed to extract {start_ts}..{end_ts} from {}: {}",
                source.display(),
                stderr_tail(&result.stderr)
            );
        }

        Ok(())
    }

    fn concat_segments(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let list_path = concat_list_path(inputs, output)?;
        let list_contents: String = inputs
            .iter()
            .map(|input| format!("file '{}'\n", input.display()))
            .collect();
        std::fs::write(&list_path, list_contents)
            .with_context(|| format!("Failed to write concat list {}", list_path.display()))?;

        let result = Command::new("ffmpeg")
            .args(["-y", "-nostdin", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .with_context(|| format!("Failed to run ffmpeg to concatenate into {}", output.display()))?;

        if !result.status.success() {
            // The list file stays behind with the clips for diagnosis
            bail!(
                "ffmpeg failed to concatenate {} clips into {}: {}",
                inputs.len(),
                output.display(),
                stderr_tail(&result.stderr)
            );
        }

        let _ = std::fs::remove_file(&list_path);
        Ok(())
    }
}

fn concat_list_path(inputs: &[PathBuf], output: &Path) -> Result<PathBuf> {
    let first = inputs
        .first()
        .with_context(|| format!("No clips to concatenate into {}", output.display()))?;
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "concat".to_string());
    Ok(first.with_file_name(format!("{stem}_concat.txt")))
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines().next_back().unwrap_or("").trim().to_string()
}

static SILENCE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"silence_start:\s*(-?\d+\.?\d*)").expect("valid regex"));
static SILENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"silence_end:\s*(\d+\.?\d*)").expect("valid regex"));

/// Pair `silence_start:`/`silence_end:` lines from silencedetect stderr into
/// ordered spans. A trailing unmatched start means the silence runs to the
/// end of the media.
pub fn parse_silence_spans(stderr: &str, duration_seconds: f64) -> Result<Vec<SilenceSpan>> {
    let mut spans = Vec::new();
    let mut pending_start: Option<i64> = None;

    for line in stderr.lines() {
        if let Some(cap) = SILENCE_START_RE.captures(line) {
            let start: f64 = cap[1]
                .parse()
                .with_context(|| format!("Unparseable silence_start in: {line}"))?;
            // silencedetect can report a slightly negative start at offset zero
            pending_start = Some((start.max(0.0) * 1000.0).round() as i64);
        } else if let Some(cap) = SILENCE_END_RE.captures(line) {
            let end: f64 = cap[1]
                .parse()
                .with_context(|| format!("Unparseable silence_end in: {line}"))?;
            if let Some(start_ms) = pending_start.take() {
                spans.push(SilenceSpan::new(start_ms, (end * 1000.0).round() as i64));
            }
        }
    }

    if let Some(start_ms) = pending_start {
        spans.push(SilenceSpan::new(
            start_ms,
            (duration_seconds * 1000.0).round() as i64,
        ));
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[silencedetect @ 0x55f] silence_start: 4.98917\n\
size=N/A time=00:00:07.98 bitrate=N/A speed= 282x\n\
[silencedetect @ 0x55f] silence_end: 7.51079 | silence_duration: 2.52163\n\
[silencedetect @ 0x55f] silence_start: 14.2\n\
[silencedetect @ 0x55f] silence_end: 17.0 | silence_duration: 2.8\n";

    #[test]
    fn pairs_start_and_end_lines() {
        let spans = parse_silence_spans(SAMPLE, 20.0).unwrap();
        assert_eq!(
            spans,
            vec![SilenceSpan::new(4989, 7511), SilenceSpan::new(14200, 17000)]
        );
    }

    #[test]
    fn unmatched_trailing_start_closes_at_media_end() {
        let stderr = "[silencedetect @ 0x55f] silence_start: 18.25\n";
        let spans = parse_silence_spans(stderr, 20.0).unwrap();
        assert_eq!(spans, vec![SilenceSpan::new(18250, 20000)]);
    }

    #[test]
    fn negative_start_is_clamped_to_zero() {
        let stderr = "\
[silencedetect @ 0x55f] silence_start: -0.00266667\n\
[silencedetect @ 0x55f] silence_end: 3.2 | silence_duration: 3.20267\n";
        let spans = parse_silence_spans(stderr, 10.0).unwrap();
        assert_eq!(spans, vec![SilenceSpan::new(0, 3200)]);
    }

    #[test]
    fn no_detection_lines_means_no_spans() {
        let stderr = "size=N/A time=00:00:07.98 bitrate=N/A speed= 282x\n";
        let spans = parse_silence_spans(stderr, 8.0).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn concat_list_lands_next_to_the_first_clip() {
        let inputs = vec![
            PathBuf::from("/tmp/work/talk_part0.mkv"),
            PathBuf::from("/tmp/work/talk_part1.mkv"),
        ];
        let list = concat_list_path(&inputs, Path::new("/out/talk.mkv")).unwrap();
        assert_eq!(list, PathBuf::from("/tmp/work/talk_concat.txt"));
    }
}
