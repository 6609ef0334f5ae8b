// src/core/mod.rs

/// Compute-once cache with request coalescing.
pub mod cache;
/// YAML page configuration.
pub mod config_loader;
/// Base directories and their lazy resolution.
pub mod paths;
/// Atomic, typed key-value settings.
pub mod settings;
/// Cached machine facts.
pub mod system_info;
