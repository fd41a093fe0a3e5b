//! Log backends.
//!
//! # Data Flow
//! ```text
//! Logger (level gate passed)
//!     → Sink (name, bound fields, call depth)
//!     → Backend::write(&Entry)
//!         Discard     drops the entry
//!         Sampler     rate limits, then forwards to its inner backend
//!         FmtBackend  formats with tracing-subscriber and writes it out
//!         MemoryBackend keeps an owned copy (tests)
//! ```
//!
//! # Design Decisions
//! - The backend is chosen when a logger is built and never switched per call
//! - Backends are shared behind `Arc`; many handles may write to one backend
//! - Writes never report errors to the caller

pub mod fmt;
pub mod memory;
pub mod sampler;

use std::panic::Location;

use crate::field::Field;
use crate::level::Level;

pub use self::fmt::FmtBackend;
pub use memory::{MemoryBackend, Record};
pub use sampler::Sampler;

/// One log call that passed the level gate.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub level: Level,
    /// Dotted logger name accumulated by `with_name`/`with_component`.
    pub name: &'a str,
    pub message: &'a str,
    /// Fields bound with `with_values`, oldest first.
    pub context: &'a [Field],
    /// Fields passed with this call.
    pub fields: &'a [Field],
    pub caller: &'static Location<'static>,
    /// Call depth of the writing handle.
    pub call_depth: usize,
    /// Frames of `call_depth` that `#[track_caller]` already folded into
    /// `caller`.
    pub elided: usize,
}

impl<'a> Entry<'a> {
    /// Frames above `caller` still to skip when attributing the line.
    pub fn frames_to_skip(&self) -> usize {
        self.call_depth.saturating_sub(self.elided)
    }

    /// Bound fields followed by call fields.
    pub fn iter_fields(&self) -> impl Iterator<Item = &'a Field> {
        self.context.iter().chain(self.fields.iter())
    }
}

/// Capability every log destination implements.
pub trait Backend: Send + Sync + std::fmt::Debug {
    fn write(&self, entry: &Entry<'_>);
}

/// Backend that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl Backend for Discard {
    fn write(&self, _entry: &Entry<'_>) {}
}
