// src/cli/handlers/get.rs

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{
    core::settings::{LoadOptions, SettingKind, SettingValue},
    state::AppContext,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Loads a setting.")]
struct GetArgs {
    /// The setting key, e.g. `theme/dark_mode`.
    key: String,

    /// How the stored text is decoded: bool, int, float or str.
    #[arg(long, short, default_value = "str")]
    kind: SettingKind,

    /// Value printed when the setting is missing or unreadable.
    #[arg(long, short)]
    default: Option<String>,

    /// Flip the result of a boolean setting.
    #[arg(long)]
    inversed: bool,
}

/// The main handler for the `get` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let get_args = GetArgs::try_parse_from(&args)?;

    let default = match &get_args.default {
        Some(raw) => SettingValue::parse(get_args.kind, raw).ok_or_else(|| {
            anyhow!("Default '{}' is not a valid {:?}.", raw, get_args.kind)
        })?,
        None => zero_value(get_args.kind),
    };

    let options = LoadOptions {
        is_inversed: get_args.inversed,
    };
    let value = ctx
        .settings()
        .load_kind(&get_args.key, get_args.kind, options)
        .unwrap_or(default);

    println!("{value}");
    Ok(())
}

fn zero_value(kind: SettingKind) -> SettingValue {
    match kind {
        SettingKind::Bool => SettingValue::Bool(false),
        SettingKind::Int => SettingValue::Int(0),
        SettingKind::Float => SettingValue::Float(0.0),
        SettingKind::Str => SettingValue::Str(String::new()),
    }
}
