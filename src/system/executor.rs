// src/system/executor.rs

use crate::constants::SHELL_METACHARACTERS;
use crate::core::paths;
use crate::models::LauncherConfig;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::env;
use std::process::{Command, Stdio};
use thiserror::Error;

lazy_static! {
    /// A `~` at the start of the string or after whitespace, followed by `/`,
    /// whitespace or the end of the string.
    static ref HOME_SHORTCUT: Regex = Regex::new(r"(^|\s)~(/|\s|$)").expect("valid regex");
    /// `$NAME` or `${NAME}`. A `$` not followed by a name is left alone, so
    /// `$$` reaches the shell untouched.
    static ref ENV_REFERENCE: Regex = Regex::new(r"\$([A-Za-z0-9_]+|\{[^}]*\})").expect("valid regex");
}

/// Why a command was not launched.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The command string is empty or blank.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// Nothing remained after expansion and trimming.
    #[error("Command '{0}' is empty after expansion.")]
    EmptyExpansion(String),
    /// Tokenizing yielded an empty argument vector.
    #[error("Command '{0}' produced no arguments.")]
    NoArguments(String),
    /// The OS refused to start the process.
    #[error("Command '{command}' could not be executed: {source}")]
    Spawn {
        /// The full argument vector, space-joined.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Turns configured command strings into detached process invocations.
///
/// Whether a command goes through the shell is decided by a plain
/// metacharacter scan. That is a usability rule (pipelines and globs just
/// work), not an injection defense: the strings come from the user's own
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct CommandLauncher {
    config: LauncherConfig,
}

impl CommandLauncher {
    /// Creates a launcher using `config` for the prefix, shell and terminal.
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// The active launcher configuration.
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Expands, classifies and launches `command` detached from the caller.
    /// Every failure is logged and reported as `false`.
    pub fn execute(&self, command: &str, title: &str, run_in_terminal: bool) -> bool {
        match self.try_execute(command, title, run_in_terminal) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{e}");
                false
            }
        }
    }

    fn try_execute(&self, command: &str, title: &str, run_in_terminal: bool) -> Result<(), LaunchError> {
        if command.trim().is_empty() {
            return Err(LaunchError::EmptyCommand);
        }

        let expanded = expand(command);
        if expanded.is_empty() {
            return Err(LaunchError::EmptyExpansion(command.to_string()));
        }

        let safe_title = sanitize_title(title, &self.config.terminal.fallback_title);
        let argv = self
            .build_argv(&expanded, &safe_title, run_in_terminal)
            .ok_or_else(|| LaunchError::NoArguments(command.to_string()))?;

        launch(&argv)
    }

    /// Builds the full argv for an already-expanded command, launcher prefix
    /// included. Returns `None` if there is nothing to run.
    pub fn build_argv(&self, expanded: &str, title: &str, run_in_terminal: bool) -> Option<Vec<String>> {
        let body = if run_in_terminal {
            let terminal = &self.config.terminal;
            let mut argv = vec![
                terminal.program.clone(),
                terminal.class_flag.clone(),
                terminal.class.clone(),
                terminal.title_flag.clone(),
                title.to_string(),
                terminal.hold_flag.clone(),
            ];
            argv.extend(self.shell_argv(expanded));
            argv
        } else if needs_shell(expanded) {
            self.shell_argv(expanded)
        } else {
            match shlex::split(expanded) {
                Some(parts) if parts.is_empty() => return None,
                Some(parts) => parts,
                None => {
                    log::debug!("Could not tokenize {expanded:?}, handing it to the shell");
                    self.shell_argv(expanded)
                }
            }
        };

        let mut argv = self.config.launcher.clone();
        argv.extend(body);
        Some(argv)
    }

    fn shell_argv(&self, command: &str) -> Vec<String> {
        vec![
            self.config.shell.clone(),
            self.config.shell_command_flag.clone(),
            command.to_string(),
        ]
    }
}

/// Substitutes `$VAR`/`${VAR}` references and a standalone leading `~`, then
/// trims. Unknown variables are left as written.
pub fn expand(raw: &str) -> String {
    let with_env = expand_env(raw, |name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()));
    expand_home_shortcut(&with_env, &paths::home_dir().to_string_lossy())
        .trim()
        .to_string()
}

fn expand_env(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_REFERENCE
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let reference = caps.get(1).map_or("", |m| m.as_str());
            let name = reference
                .strip_prefix('{')
                .and_then(|r| r.strip_suffix('}'))
                .unwrap_or(reference);
            lookup(name).unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

fn expand_home_shortcut(text: &str, home: &str) -> String {
    // Two passes: adjacent matches such as "~ ~" share the separating space.
    let mut current = text.to_string();
    for _ in 0..2 {
        current = HOME_SHORTCUT
            .replace_all(&current, |caps: &Captures<'_>| {
                let group = |i| caps.get(i).map_or("", |m| m.as_str());
                format!("{}{}{}", group(1), home, group(2))
            })
            .into_owned();
    }
    current
}

/// Makes a configured title safe for a window title: control and other
/// non-printable characters become spaces, whitespace runs collapse, and an
/// empty result becomes `fallback`.
pub fn sanitize_title(raw: &str, fallback: &str) -> String {
    let printable: String = raw
        .chars()
        .map(|c| if c.is_control() || is_invisible(c) { ' ' } else { c })
        .collect();
    let collapsed = printable.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        fallback.to_string()
    } else {
        collapsed
    }
}

/// Format (Cf) and private-use (Co) characters, plus the line and paragraph
/// separators. None of them render as visible text in a title.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2028}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

/// Returns `true` if `command` contains any shell metacharacter.
pub fn needs_shell(command: &str) -> bool {
    command.chars().any(|c| SHELL_METACHARACTERS.contains(c))
}

/// Spawns `argv` fully detached: own process group, standard streams on the
/// null device, and reaped in the background so no zombie is left behind.
/// Returns once the OS has accepted the spawn.
///
/// The reaper thread lives as long as the child. Launchers that `exec` the
/// application in place keep one parked thread per running application.
pub fn launch(argv: &[String]) -> Result<(), LaunchError> {
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut command);

    let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
        command: argv.join(" "),
        source,
    })?;
    log::debug!("Launched PID {}: {:?}", child.id(), argv);

    let pid = child.id();
    let reaper = std::thread::Builder::new()
        .name(format!("reap-{pid}"))
        .spawn(move || {
            if let Err(e) = child.wait() {
                log::warn!("Failed to reap child process {pid}: {e}");
            }
        });
    if let Err(e) = reaper {
        log::warn!("Could not start reaper for PID {pid}: {e}");
    }
    Ok(())
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach(_command: &mut Command) {}
