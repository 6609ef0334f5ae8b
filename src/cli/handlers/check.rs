// src/cli/handlers/check.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{state::AppContext, system::preflight};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Verifies the external programs dusky depends on.")]
struct CheckArgs {}

/// The main handler for the `check` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _args = CheckArgs::try_parse_from(&args)?;
    preflight::preflight_check(ctx.launcher().config(), &ctx.settings().root())?;

    let launcher = ctx.launcher().config().launcher_program().unwrap_or_default();
    println!("{} {}", "ok".green().bold(), launcher);
    println!("  {:<15} {}", "settings".blue(), ctx.settings().root().display());
    println!("  {:<15} {}", "cache".blue(), ctx.get_cache_dir().display());
    Ok(())
}
