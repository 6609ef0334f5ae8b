// src/cli/handlers/run.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::state::AppContext;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Launches a command detached from this process.")]
struct RunArgs {
    /// The command line, exactly as it would appear in the page config.
    command: String,

    /// Window title for terminal commands.
    #[arg(long, short, default_value = "")]
    title: String,

    /// Run inside a terminal window that stays open after the command exits.
    #[arg(long)]
    terminal: bool,
}

/// The main handler for the `run` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;

    if !ctx.execute_command(&run_args.command, &run_args.title, run_args.terminal) {
        return Err(anyhow!("Could not launch '{}'.", run_args.command));
    }
    println!("> {}", run_args.command.green());
    Ok(())
}
