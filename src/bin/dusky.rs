// src/bin/dusky.rs

//! Command-line front-end for the Dusky control center services.

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use dusky::{
    cli::{Cli, handlers},
    state::AppContext,
    system::preflight::{self, PreflightError},
};

// --- Command Definition and Registry ---

/// Defines a command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    /// Whether the startup dependency check must pass before the handler runs.
    needs_launcher: bool,
    handler: fn(Vec<String>, &AppContext) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "cache-dir",
        aliases: &[],
        needs_launcher: false,
        handler: handlers::cache_dir::handle,
    },
    CommandDefinition {
        name: "check",
        aliases: &[],
        needs_launcher: false,
        handler: handlers::check::handle,
    },
    CommandDefinition {
        name: "get",
        aliases: &["load"],
        needs_launcher: false,
        handler: handlers::get::handle,
    },
    CommandDefinition {
        name: "info",
        aliases: &["sysinfo"],
        needs_launcher: false,
        handler: handlers::info::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &["exec"],
        needs_launcher: true,
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "set",
        aliases: &["save"],
        needs_launcher: false,
        handler: handlers::set::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// The main entry point of the `dusky` application.
/// It sets up logging, builds the shared services, dispatches to the correct
/// handler, and performs centralized error handling.
fn main() {
    env_logger::init();
    let ctx = AppContext::from_env();

    if let Err(e) = run_cli(Cli::parse(), &ctx) {
        // A missing external dependency is a hard stop with its own diagnostic.
        if e.downcast_ref::<PreflightError>().is_some() {
            eprintln!("{}: dusky {}", "FATAL".red().bold(), e);
            std::process::exit(1);
        }

        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Routes the parsed arguments to a registered handler.
fn run_cli(cli: Cli, ctx: &AppContext) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(name) = cli.command else {
        println!("{}", "Usage: dusky <COMMAND> [ARGS...] (see --help)".yellow());
        return Ok(());
    };

    let command = find_command(&name).ok_or_else(|| anyhow!("Unknown command '{}'.", name))?;

    if command.needs_launcher {
        preflight::preflight_check(ctx.launcher().config(), &ctx.settings().root())?;
    }

    (command.handler)(cli.args, ctx)
}
