//! Shared utilities for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use opslog::{LogConfig, Logger, MemoryBackend};

/// A logger writing into a fresh in-memory backend.
pub fn memory_logger(config: &LogConfig) -> (Arc<MemoryBackend>, Logger) {
    let memory = Arc::new(MemoryBackend::new());
    let logger = Logger::new(memory.clone(), config);
    (memory, logger)
}

/// A per-process scratch path under the system temp dir.
#[allow(dead_code)]
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("opslog-it-{}-{}", std::process::id(), name))
}
