//! Logger handles.
//!
//! # Responsibilities
//! - Gate each call on the handle's effective level before any formatting
//! - Derive new handles (values, names, components, call depth, sampling)
//!   without touching the source handle
//!
//! # Design Decisions
//! - A handle holds two sink views: `sampled` is the one written to,
//!   `unsampled` is kept so a sampler can be replaced or bypassed. When no
//!   sampler is active both point at the same `Arc`, and derivation keeps
//!   them aliased
//! - Only `with_component` changes which level cell gates output; every
//!   other derivation shares the source's cell
//! - Handles are cheap to clone and meant to be built once per subsystem

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{Backend, Discard, Entry, FmtBackend, Sampler};
use crate::config::LogConfig;
use crate::error::LogResult;
use crate::field::Field;
use crate::level::{Level, LevelCell};
use crate::registry::LevelRegistry;

const DEFAULT_SAMPLE_INITIAL: u64 = 20;
const DEFAULT_SAMPLE_INTERVAL: u64 = 100;
const STARTUP_SAMPLE_TICK: Duration = Duration::from_secs(1);

/// Item sampling parameters captured from the config at construction.
///
/// Taken as configured: a zero burst or interval reaches the sampler as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParams {
    /// Window of the per-item sampler; zero disables `with_item_sampler`.
    pub window: Duration,
    pub initial: u64,
    pub interval: u64,
}

impl SamplingParams {
    pub fn from_config(config: &LogConfig) -> Self {
        Self {
            window: Duration::from_secs(config.sample_window_seconds),
            initial: config.sample_initial_burst,
            interval: config.sample_steady_interval,
        }
    }
}

fn non_zero_or(value: u64, default: u64) -> u64 {
    if value == 0 {
        default
    } else {
        value
    }
}

/// Call site captured by `#[track_caller]`, with the number of wrapper
/// frames that were folded into it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Caller {
    pub(crate) location: &'static Location<'static>,
    pub(crate) elided: usize,
}

impl Caller {
    #[track_caller]
    pub(crate) fn here() -> Self {
        Self::elided(Location::caller(), 0)
    }

    pub(crate) fn elided(location: &'static Location<'static>, elided: usize) -> Self {
        Self { location, elided }
    }
}

/// One view onto a backend: name, bound fields and caller skip.
#[derive(Clone)]
struct Sink {
    backend: Arc<dyn Backend>,
    name: String,
    context: Vec<Field>,
    call_depth: usize,
}

impl Sink {
    fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            name: String::new(),
            context: Vec::new(),
            call_depth: 0,
        }
    }

    fn with_fields(&self, fields: &[Field]) -> Sink {
        let mut dup = self.clone();
        dup.context.extend_from_slice(fields);
        dup
    }

    fn named(&self, name: &str) -> Sink {
        let mut dup = self.clone();
        if dup.name.is_empty() {
            dup.name = name.to_string();
        } else {
            dup.name.push('.');
            dup.name.push_str(name);
        }
        dup
    }

    fn with_call_depth(&self, depth: usize) -> Sink {
        let mut dup = self.clone();
        dup.call_depth += depth;
        dup
    }

    fn with_backend(&self, backend: Arc<dyn Backend>) -> Sink {
        let mut dup = self.clone();
        dup.backend = backend;
        dup
    }

    fn write(&self, level: Level, message: &str, fields: &[Field], caller: Caller) {
        self.backend.write(&Entry {
            level,
            name: &self.name,
            message,
            context: &self.context,
            fields,
            caller: caller.location,
            call_depth: self.call_depth,
            elided: caller.elided,
        });
    }
}

/// A structured, leveled logger handle.
///
/// Every `with_*` method returns a new handle; the receiver is never
/// modified.
#[derive(Clone)]
pub struct Logger {
    sampled: Arc<Sink>,
    unsampled: Arc<Sink>,
    component: String,
    registry: Arc<LevelRegistry>,
    level: LevelCell,
    sampling: SamplingParams,
}

impl Logger {
    /// Build a logger writing to `backend`, with levels and sampling taken
    /// from `config`.
    ///
    /// With `sample_enabled`, the active view is wrapped in a one second
    /// window sampler from the start; a zero burst or interval falls back
    /// to 20 and 100 there.
    pub fn new(backend: Arc<dyn Backend>, config: &LogConfig) -> Self {
        let registry = Arc::new(LevelRegistry::new(config));
        let sampling = SamplingParams::from_config(config);
        let unsampled = Arc::new(Sink::new(backend.clone()));
        let sampled = if config.sample_enabled {
            let sampler = Sampler::new(
                backend,
                STARTUP_SAMPLE_TICK,
                non_zero_or(config.sample_initial_burst, DEFAULT_SAMPLE_INITIAL),
                non_zero_or(config.sample_steady_interval, DEFAULT_SAMPLE_INTERVAL),
            );
            Arc::new(unsampled.with_backend(Arc::new(sampler)))
        } else {
            unsampled.clone()
        };

        Self {
            sampled,
            unsampled,
            component: String::new(),
            level: registry.default_level(),
            registry,
            sampling,
        }
    }

    /// Build a logger on the formatting backend described by `config`.
    pub fn from_config(config: &LogConfig) -> LogResult<Self> {
        let backend = FmtBackend::from_config(config)?;
        Ok(Self::new(Arc::new(backend), config))
    }

    /// A logger that drops everything.
    pub fn discard() -> Self {
        Self::new(Arc::new(Discard), &LogConfig::default())
    }

    // --- Derivation ---

    /// Bind `fields` to every future entry of the returned handle.
    pub fn with_values(&self, fields: &[Field]) -> Logger {
        self.derive(|sink| sink.with_fields(fields))
    }

    /// Append `name` to the logger name.
    pub fn with_name(&self, name: &str) -> Logger {
        self.derive(|sink| sink.named(name))
    }

    /// Append `component` to both the logger name and the component path,
    /// and switch to the level configured for the new path.
    pub fn with_component(&self, component: &str) -> Logger {
        let mut dup = self.with_name(component);
        if dup.component.is_empty() {
            dup.component = component.to_string();
        } else {
            dup.component.push('.');
            dup.component.push_str(component);
        }
        dup.level = dup.registry.resolve_level(&dup.component);
        dup
    }

    /// Skip `depth` more frames when attributing the caller.
    ///
    /// Frames marked `#[track_caller]` are already skipped and should not be
    /// counted; the offset is meant for plain wrapper functions.
    pub fn with_call_depth(&self, depth: usize) -> Logger {
        self.derive(|sink| sink.with_call_depth(depth))
    }

    /// Rate limit the returned handle with the configured item sampler.
    ///
    /// The sampler always wraps the unsampled view, so stacking calls never
    /// stacks samplers. Returns a plain clone when the window is zero.
    pub fn with_item_sampler(&self) -> Logger {
        if self.sampling.window.is_zero() {
            return self.clone();
        }
        let sampler = Sampler::new(
            self.unsampled.backend.clone(),
            self.sampling.window,
            self.sampling.initial,
            self.sampling.interval,
        );
        let mut dup = self.clone();
        dup.sampled = Arc::new(self.unsampled.with_backend(Arc::new(sampler)));
        dup
    }

    /// Handle that bypasses any sampler.
    pub fn without_sampler(&self) -> Logger {
        if self.is_unsampled() {
            return self.clone();
        }
        let mut dup = self.clone();
        dup.sampled = self.unsampled.clone();
        dup
    }

    /// Attach the identity of a session participant.
    pub fn with_participant(&self, identity: &str, sid: &str, is_remote: bool) -> Logger {
        let mut values = Vec::with_capacity(3);
        if !identity.is_empty() {
            values.push(Field::new("participant", identity));
        }
        if !sid.is_empty() {
            values.push(Field::new("pID", sid));
        }
        values.push(Field::new("remote", is_remote));
        self.with_values(&values)
    }

    fn derive(&self, f: impl Fn(&Sink) -> Sink) -> Logger {
        let mut dup = self.clone();
        dup.sampled = Arc::new(f(&self.sampled));
        dup.unsampled = if self.is_unsampled() {
            dup.sampled.clone()
        } else {
            Arc::new(f(&self.unsampled))
        };
        dup
    }

    // --- Logging ---

    /// True if an entry at `level` would reach the backend.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level)
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Debug, msg, None, fields, Caller::here());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Info, msg, None, fields, Caller::here());
    }

    /// Log at warn; a present `err` is appended as the `error` field.
    #[track_caller]
    pub fn warn(&self, msg: &str, err: Option<&dyn std::error::Error>, fields: &[Field]) {
        self.log(Level::Warn, msg, err, fields, Caller::here());
    }

    /// Log at error; a present `err` is appended as the `error` field.
    #[track_caller]
    pub fn error(&self, msg: &str, err: Option<&dyn std::error::Error>, fields: &[Field]) {
        self.log(Level::Error, msg, err, fields, Caller::here());
    }

    pub(crate) fn log(
        &self,
        level: Level,
        msg: &str,
        err: Option<&dyn std::error::Error>,
        fields: &[Field],
        caller: Caller,
    ) {
        if !self.enabled(level) {
            return;
        }
        match err {
            Some(err) => {
                let mut with_error = Vec::with_capacity(fields.len() + 1);
                with_error.extend_from_slice(fields);
                with_error.push(Field::new("error", err.to_string()));
                self.sampled.write(level, msg, &with_error, caller);
            }
            None => self.sampled.write(level, msg, fields, caller),
        }
    }

    // --- Introspection ---

    /// Dotted logger name.
    pub fn name(&self) -> &str {
        &self.sampled.name
    }

    /// Dotted component path used for level resolution.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Current effective level.
    pub fn level(&self) -> Level {
        self.level.get()
    }

    /// The cell gating this handle.
    pub fn level_cell(&self) -> &LevelCell {
        &self.level
    }

    /// Registry shared by every handle derived from the same root.
    pub fn registry(&self) -> &Arc<LevelRegistry> {
        &self.registry
    }

    pub fn call_depth(&self) -> usize {
        self.sampled.call_depth
    }

    pub fn sampling(&self) -> SamplingParams {
        self.sampling
    }

    /// True if the handle writes through its unsampled view.
    pub fn is_unsampled(&self) -> bool {
        Arc::ptr_eq(&self.sampled, &self.unsampled)
    }

    /// True if both handles write through the same sink view.
    pub fn same_sink(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.sampled, &b.sampled)
    }

    /// True if `self` writes through `other`'s unsampled view.
    pub fn writes_unsampled_of(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.sampled, &other.unsampled)
    }

    /// True if the handles are indistinguishable: same sink views, same level
    /// cell, same component path.
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.sampled, &b.sampled)
            && Arc::ptr_eq(&a.unsampled, &b.unsampled)
            && LevelCell::ptr_eq(&a.level, &b.level)
            && a.component == b.component
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::discard()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.sampled.name)
            .field("component", &self.component)
            .field("level", &self.level.get())
            .field("call_depth", &self.sampled.call_depth)
            .field("backend", &self.sampled.backend)
            .field("sampled", &!self.is_unsampled())
            .finish()
    }
}
