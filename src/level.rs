//! Severity levels.
//!
//! # Responsibilities
//! - Totally ordered `Level` enum (Debug < Info < Warn < Error)
//! - Lenient parsing of configured level names
//! - `LevelCell`: shared, atomically updated effective level
//!
//! # Design Decisions
//! - Parsing never fails: unknown or empty names fall back to Info
//! - Cells are read on every log call, so reads are a single relaxed load

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Log severity.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    /// Lowercase canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    /// Parse a configured level name, falling back to [`Level::Info`].
    pub fn parse_or_info(name: &str) -> Level {
        name.parse().unwrap_or(Level::Info)
    }
}

impl From<u8> for Level {
    fn from(val: u8) -> Self {
        match val {
            0 => Level::Debug,
            2 => Level::Warn,
            3 => Level::Error,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by the strict [`FromStr`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Level::Debug),
            "info" | "information" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            // severities above error collapse into it
            "error" | "err" | "dpanic" | "panic" | "fatal" | "critical" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Shorthand for [`Level::parse_or_info`].
pub fn parse_level(name: &str) -> Level {
    Level::parse_or_info(name)
}

/// A shared, mutable effective level.
///
/// Clones point at the same cell; updating one is visible through all of
/// them. Identity is what a [`crate::LevelRegistry`] hands out and caches.
#[derive(Clone)]
pub struct LevelCell(Arc<AtomicU8>);

impl LevelCell {
    pub fn new(level: Level) -> Self {
        Self(Arc::new(AtomicU8::new(level as u8)))
    }

    /// Current level.
    pub fn get(&self) -> Level {
        Level::from(self.0.load(Ordering::Relaxed))
    }

    /// Replace the current level in place.
    pub fn set(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }

    /// True if `level` passes this cell's threshold.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.get()
    }

    /// True if both handles refer to the same cell.
    pub fn ptr_eq(a: &LevelCell, b: &LevelCell) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for LevelCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LevelCell").field(&self.get()).finish()
    }
}
