//! Logging configuration.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → LogConfig (immutable snapshot)
//!     → Logger construction (encoding, output, sampling)
//!     → LevelRegistry (default + component levels)
//!
//! On change:
//!     watcher.rs sees an event for the file
//!     → loader.rs loads it; unchanged or unreadable configs stop here
//!     → apply_reloads → LevelRegistry::on_config_reload
//! ```
//!
//! # Design Decisions
//! - Only levels follow a reload; encoding, output and sampling are fixed
//!   when the logger is built
//! - All fields have defaults to allow minimal configs

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{Encoding, LogConfig};
pub use watcher::{apply_reloads, ConfigWatcher};
