//! Per-component level registry.
//!
//! # Responsibilities
//! - Hand out one [`LevelCell`] per dotted component path, created lazily
//! - Resolve a component's level from the most specific configured ancestor
//! - Recompute every cached cell when the configuration is reloaded
//!
//! # Design Decisions
//! - One mutex guards the map and the stored config; the cells themselves
//!   are atomics so the log-call hot path never touches the lock
//! - A reload recomputes every cell from scratch; there is no notion of a
//!   runtime-pinned level that survives it
//! - The empty path is the root: it resolves to the default cell itself

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::LogConfig;
use crate::level::{Level, LevelCell};

struct RegistryState {
    component_levels: HashMap<String, LevelCell>,
    config: LogConfig,
}

/// Registry shared by every logger derived from one root.
pub struct LevelRegistry {
    default: LevelCell,
    state: Mutex<RegistryState>,
}

impl LevelRegistry {
    pub fn new(config: &LogConfig) -> Self {
        Self {
            default: LevelCell::new(Level::parse_or_info(&config.level)),
            state: Mutex::new(RegistryState {
                component_levels: HashMap::new(),
                config: config.clone(),
            }),
        }
    }

    /// Cell holding the registry-wide default level.
    pub fn default_level(&self) -> LevelCell {
        self.default.clone()
    }

    /// Return the cell for `component`, creating and caching it on first use.
    pub fn resolve_level(&self, component: &str) -> LevelCell {
        if component.is_empty() {
            return self.default.clone();
        }

        let mut state = self.lock();
        if let Some(cell) = state.component_levels.get(component) {
            return cell.clone();
        }

        let level = configured_level(&state.config, component).unwrap_or_else(|| self.default.get());
        let cell = LevelCell::new(level);
        state
            .component_levels
            .insert(component.to_string(), cell.clone());
        cell
    }

    /// Apply a new configuration: update the default, store the snapshot and
    /// recompute every cached component cell in place.
    pub fn on_config_reload(&self, config: &LogConfig) {
        let mut state = self.lock();
        let default = Level::parse_or_info(&config.level);
        self.default.set(default);
        state.config = config.clone();

        let RegistryState {
            component_levels,
            config,
        } = &mut *state;
        for (component, cell) in component_levels.iter() {
            cell.set(configured_level(config, component).unwrap_or(default));
        }
    }

    /// Number of cached component cells.
    pub fn len(&self) -> usize {
        self.lock().component_levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        // state is always left consistent, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for LevelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelRegistry")
            .field("default", &self.default.get())
            .field("components", &self.len())
            .finish()
    }
}

/// Search `config` for `component`, then for each ancestor obtained by
/// dropping the last dot segment.
fn configured_level(config: &LogConfig, component: &str) -> Option<Level> {
    let mut search = component;
    loop {
        if let Some(name) = config.component_levels.get(search) {
            return Some(Level::parse_or_info(name));
        }
        match search.rfind('.') {
            Some(idx) => search = &search[..idx],
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_component_uses_default() {
        let registry = LevelRegistry::new(&LogConfig::with_level("warn"));
        assert_eq!(registry.resolve_level("x.y").get(), Level::Warn);
    }

    #[test]
    fn test_ancestor_match_wins() {
        let config = LogConfig::with_level("info").component("a.b", "warn");
        let registry = LevelRegistry::new(&config);

        assert_eq!(registry.resolve_level("a.b.c").get(), Level::Warn);
        assert_eq!(registry.resolve_level("a.b").get(), Level::Warn);
        assert_eq!(registry.resolve_level("a").get(), Level::Info);
        assert_eq!(registry.resolve_level("x.y").get(), Level::Info);
    }

    #[test]
    fn test_most_specific_ancestor() {
        let config = LogConfig::with_level("info")
            .component("a", "error")
            .component("a.b", "debug");
        let registry = LevelRegistry::new(&config);

        assert_eq!(registry.resolve_level("a.b.c.d").get(), Level::Debug);
        assert_eq!(registry.resolve_level("a.z").get(), Level::Error);
    }

    #[test]
    fn test_prefix_is_segment_based() {
        let config = LogConfig::with_level("info").component("ab", "error");
        let registry = LevelRegistry::new(&config);
        assert_eq!(registry.resolve_level("abc").get(), Level::Info);
        assert_eq!(registry.resolve_level("ab.c").get(), Level::Error);
    }

    #[test]
    fn test_cells_are_cached() {
        let registry = LevelRegistry::new(&LogConfig::default());
        let first = registry.resolve_level("svc.a");
        let second = registry.resolve_level("svc.a");
        assert!(LevelCell::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_path_is_default_cell() {
        let registry = LevelRegistry::new(&LogConfig::with_level("error"));
        let root = registry.resolve_level("");
        assert!(LevelCell::ptr_eq(&root, &registry.default_level()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unparsable_level_is_info() {
        let config = LogConfig::with_level("loud").component("svc", "???");
        let registry = LevelRegistry::new(&config);
        assert_eq!(registry.default_level().get(), Level::Info);
        assert_eq!(registry.resolve_level("svc.a").get(), Level::Info);
    }

    #[test]
    fn test_reload_recomputes_cached_cells() {
        let registry = LevelRegistry::new(&LogConfig::with_level("info"));
        let cell = registry.resolve_level("svc.a");
        assert_eq!(cell.get(), Level::Info);

        registry.on_config_reload(&LogConfig::with_level("info").component("svc", "error"));
        assert_eq!(cell.get(), Level::Error);
    }

    #[test]
    fn test_reload_drops_removed_override() {
        let config = LogConfig::with_level("info").component("svc.a", "debug");
        let registry = LevelRegistry::new(&config);
        let cell = registry.resolve_level("svc.a");
        assert_eq!(cell.get(), Level::Debug);

        registry.on_config_reload(&LogConfig::with_level("warn"));
        assert_eq!(cell.get(), Level::Warn);
        assert_eq!(registry.default_level().get(), Level::Warn);
    }

    #[test]
    fn test_new_cells_after_reload_use_new_config() {
        let registry = LevelRegistry::new(&LogConfig::with_level("info"));
        registry.on_config_reload(&LogConfig::with_level("debug").component("db", "error"));

        assert_eq!(registry.resolve_level("db.pool").get(), Level::Error);
        assert_eq!(registry.resolve_level("web").get(), Level::Debug);
    }
}
