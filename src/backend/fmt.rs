//! Full backend: formatting and output via `tracing-subscriber`.
//!
//! Human lines are `tracing` events sent to a private `fmt` subscriber, so the
//! backend neither needs nor disturbs a process-wide subscriber. JSON lines
//! are one object per entry, with the pairs as top-level keys in call order
//! (repeated keys included), written to the same kind of `MakeWriter`.
//!
//! The caller comes from `#[track_caller]`. When the handle still has frames
//! to skip, the stack is walked outwards from that call site with
//! `backtrace`; without debug info the tracked location is kept.

use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use backtrace::{Backtrace, BacktraceSymbol};
use serde::Serialize;
use tracing::Dispatch;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

use super::{Backend, Entry};
use crate::config::{Encoding, LogConfig};
use crate::error::{LogError, LogResult};
use crate::level::Level;

macro_rules! emit {
    ($level:expr, $name:expr, $caller:expr, $kv:expr, $message:expr) => {
        tracing::event!(
            target: "opslog",
            $level,
            logger = $name,
            caller = %$caller,
            kv = %$kv,
            "{}",
            $message
        )
    };
}

enum Output {
    Events(Dispatch),
    Lines(BoxMakeWriter),
}

/// Backend that renders entries as JSON or human readable lines.
pub struct FmtBackend {
    output: Output,
}

impl FmtBackend {
    /// Build from the `encoding` and `output` settings.
    pub fn from_config(config: &LogConfig) -> LogResult<Self> {
        let output = config.output.trim();
        let backend = match output {
            "" => return Err(LogError::EmptyOutput),
            "stderr" => Self::with_writer(config.encoding, std::io::stderr, true),
            "stdout" => Self::with_writer(config.encoding, std::io::stdout, true),
            path => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LogError::Output {
                        path: path.to_string(),
                        source,
                    })?;
                Self::with_writer(config.encoding, BoxMakeWriter::new(Arc::new(file)), false)
            }
        };
        Ok(backend)
    }

    /// Build on top of any `MakeWriter`. `ansi` only affects human output.
    pub fn with_writer<W>(encoding: Encoding, writer: W, ansi: bool) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let output = match encoding {
            Encoding::Json => Output::Lines(BoxMakeWriter::new(writer)),
            Encoding::Human => {
                let subscriber = tracing_subscriber::fmt()
                    .with_writer(writer)
                    .with_max_level(tracing::Level::DEBUG)
                    .with_target(false)
                    .with_ansi(ansi)
                    .finish();
                Output::Events(Dispatch::new(subscriber))
            }
        };
        Self { output }
    }

    pub fn encoding(&self) -> Encoding {
        match self.output {
            Output::Events(_) => Encoding::Human,
            Output::Lines(_) => Encoding::Json,
        }
    }
}

impl Backend for FmtBackend {
    fn write(&self, entry: &Entry<'_>) {
        let site = Site::of(entry);
        match &self.output {
            Output::Events(dispatch) => {
                let kv = KeyValues(entry);
                let (name, message) = (entry.name, entry.message);
                tracing::dispatcher::with_default(dispatch, || match entry.level {
                    Level::Debug => emit!(tracing::Level::DEBUG, name, site, kv, message),
                    Level::Info => emit!(tracing::Level::INFO, name, site, kv, message),
                    Level::Warn => emit!(tracing::Level::WARN, name, site, kv, message),
                    Level::Error => emit!(tracing::Level::ERROR, name, site, kv, message),
                });
            }
            Output::Lines(writer) => {
                let mut line = String::with_capacity(256);
                if json_line(&mut line, entry, &site).is_ok() {
                    line.push('\n');
                    let _ = writer.make_writer().write_all(line.as_bytes());
                }
            }
        }
    }
}

impl fmt::Debug for FmtBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FmtBackend")
            .field("encoding", &self.encoding())
            .finish()
    }
}

/// Where a line is attributed.
enum Site {
    Tracked(&'static Location<'static>),
    Resolved(String),
}

impl Site {
    fn of(entry: &Entry<'_>) -> Self {
        match entry.frames_to_skip() {
            0 => Site::Tracked(entry.caller),
            skip => skip_frames(entry.caller, skip)
                .map_or(Site::Tracked(entry.caller), Site::Resolved),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Tracked(location) => write!(f, "{}", location),
            Site::Resolved(frame) => f.write_str(frame),
        }
    }
}

/// `file:line[:col]` of the frame `skip` levels above `origin`, with inlined
/// frames counted as frames.
fn skip_frames(origin: &Location<'_>, skip: usize) -> Option<String> {
    let trace = Backtrace::new();
    let symbols: Vec<&BacktraceSymbol> = trace.frames().iter().flat_map(|f| f.symbols()).collect();
    let start = symbols.iter().position(|symbol| is_at(symbol, origin))?;
    let target = symbols.get(start + skip)?;
    let file = target.filename()?.display();
    let line = target.lineno()?;
    Some(match target.colno() {
        Some(col) => format!("{}:{}:{}", file, line, col),
        None => format!("{}:{}", file, line),
    })
}

fn is_at(symbol: &BacktraceSymbol, origin: &Location<'_>) -> bool {
    symbol.lineno() == Some(origin.line())
        && symbol
            .filename()
            .is_some_and(|file| file.ends_with(Path::new(origin.file())))
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warn => "WARN",
        Level::Error => "ERROR",
    }
}

fn json_line(out: &mut String, entry: &Entry<'_>, site: &Site) -> fmt::Result {
    let mut timestamp = String::new();
    SystemTime.format_time(&mut Writer::new(&mut timestamp))?;

    out.push('{');
    push_pair(out, "timestamp", &timestamp)?;
    out.push(',');
    push_pair(out, "level", level_label(entry.level))?;
    if !entry.name.is_empty() {
        out.push(',');
        push_pair(out, "logger", entry.name)?;
    }
    out.push(',');
    push_pair(out, "caller", &site.to_string())?;
    out.push(',');
    push_pair(out, "message", entry.message)?;
    for field in entry.iter_fields() {
        out.push(',');
        push_pair(out, &field.key, &field.value)?;
    }
    out.push('}');
    Ok(())
}

fn push_pair<T: Serialize + ?Sized>(out: &mut String, key: &str, value: &T) -> fmt::Result {
    let key = serde_json::to_string(key).map_err(|_| fmt::Error)?;
    let value = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    write!(out, "{}:{}", key, value)
}

/// Renders an entry's pairs for human output: `k1=v1 k2=v2`.
struct KeyValues<'a, 'e>(&'a Entry<'e>);

impl fmt::Display for KeyValues<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter_fields().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
