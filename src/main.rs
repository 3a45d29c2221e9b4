mod cut;
mod ui;

use clap::Parser;

use crate::cut::CutCommands;
use crate::ui::prelude::{Level, OutputFormat, emit};

/// quietcut main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print extra diagnostics while processing
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit machine-readable JSON events instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: CutCommands,
}

fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    ui::init(
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        true,
    );

    if let Err(error) = cut::handle_cut_command(cli.command) {
        emit(Level::Error, "cut.error", &format!("{error:#}"), None);
        std::process::exit(1);
    }
}
