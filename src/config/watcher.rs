//! Hot reload of the logging config.
//!
//! # Design Decisions
//! - The parent directory is watched, not the file, so editors that save by
//!   writing a new file and renaming it over the old one stay followed;
//!   events about other files in that directory are ignored
//! - One save usually arrives as several events (create, then modify, or
//!   several data writes). A config equal to the last one delivered is not
//!   sent again, so each distinct edit reloads once
//! - A file that fails to load leaves the current levels in place

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::LogConfig;
use crate::registry::LevelRegistry;

/// Watches one logging config file and delivers every changed version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LogConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates; pass the
    /// receiver to [`apply_reloads`].
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LogConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching on notify's background thread.
    ///
    /// Updates stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut changes = ConfigChanges::new(self.path.clone(), self.update_tx);

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| changes.on_event(res))?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::debug!(path = %self.path.display(), "log config watch started");
        Ok(watcher)
    }
}

/// Turns raw notify events for one file into distinct loaded configs.
struct ConfigChanges {
    path: PathBuf,
    last: Option<LogConfig>,
    update_tx: mpsc::UnboundedSender<LogConfig>,
}

impl ConfigChanges {
    fn new(path: PathBuf, update_tx: mpsc::UnboundedSender<LogConfig>) -> Self {
        let last = load_config(&path).ok();
        Self {
            path,
            last,
            update_tx,
        }
    }

    fn on_event(&mut self, res: notify::Result<Event>) {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "log config watch error");
                return;
            }
        };
        if !(event.kind.is_modify() || event.kind.is_create()) || !self.touches_file(&event) {
            return;
        }

        match load_config(&self.path) {
            Ok(config) if self.last.as_ref() == Some(&config) => {}
            Ok(config) => {
                self.last = Some(config.clone());
                if self.update_tx.send(config).is_err() {
                    tracing::debug!(path = %self.path.display(), "log config receiver gone");
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "log config not reloaded, keeping current levels"
                );
            }
        }
    }

    fn touches_file(&self, event: &Event) -> bool {
        let name = self.path.file_name();
        event.paths.iter().any(|p| p.file_name() == name)
    }
}

/// Apply every delivered config to `registry` until the watcher is dropped.
pub async fn apply_reloads(
    mut updates: mpsc::UnboundedReceiver<LogConfig>,
    registry: Arc<LevelRegistry>,
) {
    while let Some(config) = updates.recv().await {
        registry.on_config_reload(&config);
        tracing::info!(
            level = %config.level,
            components = config.component_levels.len(),
            "log levels reloaded"
        );
    }
}
