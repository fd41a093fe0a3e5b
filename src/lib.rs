//! Structured logging facade.
//!
//! Leveled, keyed logging (`debug/info/warn/error` with key-value pairs) over
//! a pluggable backend, with per-component levels resolved from a dotted
//! component hierarchy, and optional per-item sampling that can be bypassed.
//!
//! ```
//! use std::sync::Arc;
//! use opslog::{fields, Logger, LogConfig, MemoryBackend};
//!
//! let config = LogConfig::with_level("info").component("svc.db", "debug");
//! let memory = Arc::new(MemoryBackend::new());
//! let logger = Logger::new(memory.clone(), &config).with_name("OpsLink");
//!
//! let db = logger.with_component("svc").with_component("db");
//! db.debug("pool ready", &fields!["size" => 8]);
//! logger.debug("dropped", &[]);
//!
//! let records = memory.records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].name, "OpsLink.svc.db");
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod field;
pub mod global;
pub mod level;
pub mod logger;
pub mod registry;

pub use backend::{Backend, Discard, Entry, FmtBackend, MemoryBackend, Record, Sampler};
pub use config::{Encoding, LogConfig};
pub use error::{LogError, LogResult};
pub use field::{Field, Value};
pub use global::{
    debugw, errorw, get_logger, infow, init_log_config, reload_log_config, set_logger, warnw,
};
pub use level::{parse_level, Level, LevelCell};
pub use logger::{Logger, SamplingParams};
pub use registry::LevelRegistry;
