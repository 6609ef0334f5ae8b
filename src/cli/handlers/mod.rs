// src/cli/handlers/mod.rs

// One module per CLI command. Every handler has the signature
// `fn(Vec<String>, &AppContext) -> anyhow::Result<()>`.

/// `cache-dir`
pub mod cache_dir;
/// `check`
pub mod check;
/// `get`
pub mod get;
/// `info`
pub mod info;
/// `run`
pub mod run;
/// `set`
pub mod set;
