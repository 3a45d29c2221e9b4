use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::cli::TunableArgs;

/// Detection tunables, loaded from the user config file when present and
/// overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    /// Minimum silence length in milliseconds before a passage is cut
    pub min_silence_ms: i64,
    /// Loudness threshold in dB below which audio counts as silence
    pub silence_threshold_db: i32,
    /// File extensions treated as processable video
    pub video_extensions: Vec<String>,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 2000,
            silence_threshold_db: -40,
            video_extensions: vec!["mkv".to_string()],
        }
    }
}

impl CutConfig {
    pub fn load() -> Result<Self> {
        let Some(path) = config_file_path() else {
            return Ok(Self::default());
        };
        if !path.is_file() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_overrides(&mut self, tunables: &TunableArgs) {
        if let Some(min_silence_ms) = tunables.min_silence_ms {
            self.min_silence_ms = min_silence_ms;
        }
        if let Some(threshold_db) = tunables.silence_threshold_db {
            self.silence_threshold_db = threshold_db;
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quietcut").join("config.toml"))
}

/// Where one batch reads sources and writes its artifacts. All components get
/// their paths from here; nothing resolves against the working directory on
/// its own.
#[derive(Debug, Clone)]
pub struct WorkLayout {
    pub root: PathBuf,
    pub temp_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl WorkLayout {
    pub fn new(root: &Path, temp_dir: Option<PathBuf>, out_dir: Option<PathBuf>) -> Self {
        Self {
            root: root.to_path_buf(),
            temp_dir: temp_dir.unwrap_or_else(|| root.join("temp")),
            out_dir: out_dir.unwrap_or_else(|| root.join("out")),
        }
    }

    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.temp_dir, &self.out_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create working directory {}", dir.display()))?;
        }
        Ok(())
    }

    fn relative(&self, source: &Path) -> PathBuf {
        source
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(source.file_name().unwrap_or_default()))
    }

    /// The reusable audio artifact for a source: `<temp>/<relative>.mp3`.
    pub fn audio_artifact(&self, source: &Path) -> PathBuf {
        let mut path = self.temp_dir.join(self.relative(source));
        path.set_extension("mp3");
        path
    }

    /// The final trimmed video: `<out>/<relative>`, same extension.
    pub fn output_file(&self, source: &Path) -> PathBuf {
        self.out_dir.join(self.relative(source))
    }

    /// An intermediate clip for multi-segment extraction. The name carries
    /// the segment index and the relative path namespaces it per source.
    pub fn intermediate(&self, source: &Path, index: usize) -> PathBuf {
        let relative = self.relative(source);
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = relative
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut path = self.temp_dir.join(relative);
        path.set_file_name(format!("{stem}_part{index}.{extension}"));
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> WorkLayout {
        WorkLayout::new(Path::new("/videos"), None, None)
    }

    #[test]
    fn defaults_match_the_detection_tunables() {
        let config = CutConfig::default();
        assert_eq!(config.min_silence_ms, 2000);
        assert_eq!(config.silence_threshold_db, -40);
        assert_eq!(config.video_extensions, vec!["mkv"]);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = CutConfig::from_toml("min_silence_ms = 1500\n").unwrap();
        assert_eq!(config.min_silence_ms, 1500);
        assert_eq!(config.silence_threshold_db, -40);
    }

    #[test]
    fn cli_flags_override_config_values() {
        let mut config = CutConfig::default();
        config.apply_overrides(&TunableArgs {
            min_silence_ms: Some(3000),
            silence_threshold_db: None,
        });
        assert_eq!(config.min_silence_ms, 3000);
        assert_eq!(config.silence_threshold_db, -40);
    }

    #[test]
    fn default_dirs_hang_off_the_root() {
        let layout = layout();
        assert_eq!(layout.temp_dir, PathBuf::from("/videos/temp"));
        assert_eq!(layout.out_dir, PathBuf::from("/videos/out"));
    }

    #[test]
    fn artifact_paths_mirror_the_source_tree() {
        let layout = layout();
        let source = Path::new("/videos/talks/intro.mkv");
        assert_eq!(
            layout.audio_artifact(source),
            PathBuf::from("/videos/temp/talks/intro.mp3")
        );
        assert_eq!(
            layout.output_file(source),
            PathBuf::from("/videos/out/talks/intro.mkv")
        );
        assert_eq!(
            layout.intermediate(source, 2),
            PathBuf::from("/videos/temp/talks/intro_part2.mkv")
        );
    }

    #[test]
    fn sources_outside_the_root_fall_back_to_their_file_name() {
        let layout = layout();
        let source = Path::new("/elsewhere/clip.mkv");
        assert_eq!(
            layout.output_file(source),
            PathBuf::from("/videos/out/clip.mkv")
        );
    }
}
