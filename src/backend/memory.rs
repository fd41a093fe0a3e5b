//! In-memory backend for assertions on log output.

use std::sync::Mutex;

use super::{Backend, Entry};
use crate::field::{Field, Value};
use crate::level::Level;

/// Owned copy of an [`Entry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub name: String,
    pub message: String,
    pub fields: Vec<Field>,
    pub call_depth: usize,
    /// Frames above `file:line` the handle still asked to skip.
    pub skip: usize,
    pub file: &'static str,
    pub line: u32,
}

impl Record {
    /// Value of the last field named `key`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.key == key)
            .map(|f| &f.value)
    }

    /// Keys and values flattened in order, `[k1, v1, k2, v2, ...]`.
    pub fn pairs(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|f| [f.key.clone(), f.value.to_string()])
            .collect()
    }
}

/// Records every entry it receives.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<Record>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// Remove and return everything written so far.
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Backend for MemoryBackend {
    fn write(&self, entry: &Entry<'_>) {
        let record = Record {
            level: entry.level,
            name: entry.name.to_string(),
            message: entry.message.to_string(),
            fields: entry.iter_fields().cloned().collect(),
            call_depth: entry.call_depth,
            skip: entry.frames_to_skip(),
            file: entry.caller.file(),
            line: entry.caller.line(),
        };
        self.lock().push(record);
    }
}
