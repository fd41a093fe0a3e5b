//! Process-wide logger handles.
//!
//! # Lifecycle
//! ```text
//! process start   → both handles are a discard logger; calls are dropped
//! init/set_logger → both handles replaced in one atomic swap
//! reload          → levels of the installed logger recomputed in place
//! ```
//!
//! # Design Decisions
//! - The pair lives in one `ArcSwapOption`, so a replacement is a single
//!   pointer swap and readers never block. Configure logging at startup
//!   before spawning threads that log: calls racing a swap may land on
//!   either the old or the new logger
//! - The package handle carries two more frames of call depth than the
//!   default one, for the free functions below
//! - Nothing here buffers: calls made before initialization are gone

use std::panic::Location;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;

use crate::config::LogConfig;
use crate::error::LogResult;
use crate::field::Field;
use crate::level::Level;
use crate::logger::{Caller, Logger};

/// Frames added by the free functions on top of the default handle.
const PACKAGE_CALL_DEPTH: usize = 2;

struct Loggers {
    default: Logger,
    package: Logger,
}

static LOGGERS: ArcSwapOption<Loggers> = ArcSwapOption::const_empty();

static DISCARD: LazyLock<Logger> = LazyLock::new(Logger::discard);

/// Build a logger from `config` and install it under `system`.
///
/// On error the installed handles are left untouched.
pub fn init_log_config(config: &LogConfig, system: &str) -> LogResult<()> {
    let logger = Logger::from_config(config)?;
    set_logger(&logger, system);
    Ok(())
}

/// Install `logger` as both process-wide handles, named `name`.
pub fn set_logger(logger: &Logger, name: &str) {
    let loggers = Loggers {
        default: logger.with_name(name),
        package: logger.with_call_depth(PACKAGE_CALL_DEPTH).with_name(name),
    };
    LOGGERS.store(Some(Arc::new(loggers)));
}

/// The handle installed by [`set_logger`], or a discard logger.
pub fn get_logger() -> Logger {
    match LOGGERS.load().as_ref() {
        Some(loggers) => loggers.default.clone(),
        None => DISCARD.clone(),
    }
}

/// Apply a new configuration to the levels of the installed logger.
///
/// Encoding, output and sampling stay as they were when it was built.
pub fn reload_log_config(config: &LogConfig) {
    if let Some(loggers) = LOGGERS.load().as_ref() {
        loggers.default.registry().on_config_reload(config);
    }
}

fn log_package(
    level: Level,
    msg: &str,
    err: Option<&dyn std::error::Error>,
    fields: &[Field],
    location: &'static Location<'static>,
) {
    // The free function and this helper are the package depth; both are
    // already skipped by `#[track_caller]`.
    let caller = Caller::elided(location, PACKAGE_CALL_DEPTH);
    match LOGGERS.load().as_ref() {
        Some(loggers) => loggers.package.log(level, msg, err, fields, caller),
        None => DISCARD.log(level, msg, err, fields, caller),
    }
}

#[track_caller]
pub fn debugw(msg: &str, fields: &[Field]) {
    log_package(Level::Debug, msg, None, fields, Location::caller());
}

#[track_caller]
pub fn infow(msg: &str, fields: &[Field]) {
    log_package(Level::Info, msg, None, fields, Location::caller());
}

#[track_caller]
pub fn warnw(msg: &str, err: Option<&dyn std::error::Error>, fields: &[Field]) {
    log_package(Level::Warn, msg, err, fields, Location::caller());
}

#[track_caller]
pub fn errorw(msg: &str, err: Option<&dyn std::error::Error>, fields: &[Field]) {
    log_package(Level::Error, msg, err, fields, Location::caller());
}
