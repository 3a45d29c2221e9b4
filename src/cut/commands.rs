use anyhow::Result;

use super::cli::CutCommands;
use super::inspect::handle_inspect;
use super::pipeline::handle_run;

pub fn handle_cut_command(command: CutCommands) -> Result<()> {
    match command {
        CutCommands::Run(args) => handle_run(args),
        CutCommands::Inspect(args) => handle_inspect(args),
    }
}
