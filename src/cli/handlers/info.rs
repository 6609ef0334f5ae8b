// src/cli/handlers/info.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use serde_json::{Map, Value};

use crate::{constants::LABEL_NA, core::system_info::SystemFact, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Displays system facts.")]
struct InfoArgs {
    /// A single fact to show. All facts are shown if omitted.
    key: Option<String>,

    /// Print the result as a JSON object.
    #[arg(long)]
    json: bool,
}

/// The main handler for the `info` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let info_args = InfoArgs::try_parse_from(&args)?;

    let facts: Vec<(String, String)> = match &info_args.key {
        Some(key) => {
            // Validate up front so a typo is an error rather than a silent "N/A".
            let fact: SystemFact = key.parse().map_err(|e: String| anyhow!(e))?;
            vec![(fact.key().to_string(), ctx.get_system_value(fact.key()))]
        }
        None => ctx
            .system_info()
            .snapshot()
            .into_iter()
            .map(|(fact, value)| (fact.key().to_string(), value))
            .collect(),
    };

    if info_args.json {
        let object: Map<String, Value> = facts
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&object)?);
        return Ok(());
    }

    for (key, value) in facts {
        let rendered = if value == LABEL_NA {
            value.dimmed()
        } else {
            value.normal()
        };
        println!("  {:<15} {}", key.blue(), rendered);
    }
    Ok(())
}
