// src/cli/handlers/set.rs

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{
    core::settings::{SaveOptions, SettingKind, SettingValue},
    state::AppContext,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Saves a setting atomically.")]
struct SetArgs {
    /// The setting key, e.g. `theme/dark_mode`.
    key: String,

    /// The value to store.
    #[arg(allow_hyphen_values = true)]
    value: String,

    /// How the value is interpreted: bool, int, float or str.
    #[arg(long, short, default_value = "str")]
    kind: SettingKind,

    /// Store booleans as 1/0.
    #[arg(long)]
    as_int: bool,
}

/// The main handler for the `set` command.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let set_args = SetArgs::try_parse_from(&args)?;

    let value = SettingValue::parse(set_args.kind, &set_args.value).ok_or_else(|| {
        anyhow!("'{}' is not a valid {:?}.", set_args.value, set_args.kind)
    })?;
    let options = SaveOptions {
        as_int: set_args.as_int,
    };

    if !ctx.settings().save_value(&set_args.key, &value, options) {
        return Err(anyhow!("Could not save setting '{}'.", set_args.key));
    }
    Ok(())
}
