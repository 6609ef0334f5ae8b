//! Concurrency and persistence core of the Dusky control center.
//!
//! - [`core::cache`]: single-flight, compute-once cache.
//! - [`core::paths`]: lazily created, canonical base directories.
//! - [`core::settings`]: crash-consistent, one-file-per-key settings.
//! - [`core::system_info`]: cached machine facts.
//! - [`system::executor`]: detached launching of configured commands.
//! - [`state::AppContext`]: the process-lifetime service object tying them together.

/// Command-line surface used by the `dusky` binary.
pub mod cli;
/// Fixed names and limits.
pub mod constants;
/// In-process services: paths, cache, settings, system facts.
pub mod core;
/// Serializable configuration models.
pub mod models;
/// The application context shared by every caller.
pub mod state;
/// Process spawning and environment checks.
pub mod system;
