use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum CutCommands {
    /// Find videos under a directory and cut the silent passages out of each
    Run(RunArgs),
    /// Detect silences in one file and show the cut plan without writing anything
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory to search for video files
    #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
    pub root: PathBuf,

    /// Directory for extracted audio and intermediate clips; defaults to <root>/temp
    #[arg(long = "temp-dir", value_hint = ValueHint::DirPath)]
    pub temp_dir: Option<PathBuf>,

    /// Directory where trimmed videos are written; defaults to <root>/out
    #[arg(long = "out-dir", value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Report file path; defaults to quietcut_<timestamp>.log in the current directory
    #[arg(long = "log-file", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub tunables: TunableArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Video file to analyze
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// Directory for the extracted audio artifact; defaults to temp next to the video
    #[arg(long = "temp-dir", value_hint = ValueHint::DirPath)]
    pub temp_dir: Option<PathBuf>,

    #[command(flatten)]
    pub tunables: TunableArgs,
}

/// Detection tunables shared by run and inspect.
#[derive(Args, Debug, Clone)]
pub struct TunableArgs {
    /// Minimum silence length in milliseconds before a passage is cut
    #[arg(long = "min-silence", value_name = "MS")]
    pub min_silence_ms: Option<i64>,

    /// Loudness threshold in dB below which audio counts as silence
    #[arg(long = "threshold", value_name = "DB", allow_hyphen_values = true)]
    pub silence_threshold_db: Option<i32>,
}
