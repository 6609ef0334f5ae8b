use clap::Parser;

/// Per-command argument parsing and execution.
pub mod handlers;

const COMMANDS_HELP: &str = "\
Commands:
  cache-dir                         Print the resolved cache directory
  info [KEY] [--json]               Show system facts (memory_total, cpu_model, gpu_model, kernel_version)
  get <KEY> [--kind K] [--default V] [--inversed]
                                    Load a setting (K: bool, int, float, str)
  set <KEY> <VALUE> [--kind K] [--as-int]
                                    Save a setting atomically
  run <COMMAND> [--title T] [--terminal]
                                    Launch a command detached from this process
  check                             Verify required external programs";

/// dusky: settings, system facts and command launching for the Dusky control center.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    after_help = COMMANDS_HELP,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command to run.
    pub command: Option<String>,

    /// Arguments for the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
