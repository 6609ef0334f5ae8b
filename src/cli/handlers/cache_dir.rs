// src/cli/handlers/cache_dir.rs

use anyhow::Result;
use clap::Parser;

use crate::state::AppContext;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Prints the resolved cache directory.")]
struct CacheDirArgs {}

/// The main handler for the `cache-dir` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let _args = CacheDirArgs::try_parse_from(&args)?;
    println!("{}", ctx.get_cache_dir().display());
    Ok(())
}
