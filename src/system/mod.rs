//! # System Interaction Layer
//!
//! This module holds everything that reaches outside the process: spawning
//! user-configured commands and checking the environment they depend on.
//!
//! ## Modules
//!
//! - **`executor`**: Expands, classifies and launches command strings as fully
//!   detached processes behind the session launcher front-end.
//! - **`launcher_config`**: Loads `launcher.toml`, which names the launcher,
//!   shell and terminal used by the executor.
//! - **`preflight`**: The startup dependency check.

/// Detached command launching.
pub mod executor;
/// `launcher.toml` loading.
pub mod launcher_config;
/// Startup dependency check.
pub mod preflight;
