//! Hierarchical level resolution and reload, seen through logger handles.

use std::sync::Arc;
use std::thread;

use opslog::{fields, Level, LevelCell, LevelRegistry, LogConfig};

mod common;

#[test]
fn test_no_configured_ancestor_uses_default() {
    for default in ["debug", "info", "warn", "error"] {
        let registry = LevelRegistry::new(&LogConfig::with_level(default));
        for path in ["x", "x.y", "x.y.z", "deep.er.still.down"] {
            assert_eq!(registry.resolve_level(path).get(), opslog::parse_level(default));
        }
    }
}

#[test]
fn test_ancestor_versus_unrelated_path() {
    let config = LogConfig::with_level("info").component("a.b", "warn");
    let registry = LevelRegistry::new(&config);

    assert_eq!(registry.resolve_level("a.b.c").get(), Level::Warn);
    assert_eq!(registry.resolve_level("x.y").get(), Level::Info);
}

#[test]
fn test_reload_recompute_scenario() {
    let (memory, logger) = common::memory_logger(&LogConfig::with_level("info"));
    let svc_a = logger.with_component("svc").with_component("a");
    assert_eq!(svc_a.level(), Level::Info);

    svc_a.info("before reload", &[]);
    logger
        .registry()
        .on_config_reload(&LogConfig::with_level("info").component("svc", "error"));

    assert_eq!(svc_a.level(), Level::Error);
    svc_a.warn("suppressed", None, &[]);
    svc_a.error("kept", None, &fields!["attempt" => 3]);

    let messages: Vec<_> = memory.take().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, ["before reload", "kept"]);
}

#[test]
fn test_reload_changes_root_handles() {
    let (memory, logger) = common::memory_logger(&LogConfig::with_level("error"));
    logger.info("dropped", &[]);

    logger.registry().on_config_reload(&LogConfig::with_level("debug"));
    logger.debug("kept", &[]);

    assert_eq!(memory.len(), 1);
}

#[test]
fn test_sibling_components_share_cells() {
    let (_, logger) = common::memory_logger(&LogConfig::default());
    let a = logger.with_component("svc");
    let b = logger.with_name("other").with_component("svc");

    assert!(LevelCell::ptr_eq(a.level_cell(), b.level_cell()));
    assert_eq!(logger.registry().len(), 1);
}

#[test]
fn test_concurrent_resolution_and_reload() {
    let registry = Arc::new(LevelRegistry::new(&LogConfig::with_level("info")));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                for j in 0..200 {
                    let path = format!("svc.worker{}.task{}", i, j % 10);
                    let cell = registry.resolve_level(&path);
                    let _ = cell.enabled(Level::Debug);
                    if j % 50 == 0 {
                        registry.on_config_reload(&LogConfig::with_level("warn"));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    registry.on_config_reload(&LogConfig::with_level("info").component("svc", "debug"));
    assert_eq!(registry.len(), 80);
    assert_eq!(registry.resolve_level("svc.worker3.task7").get(), Level::Debug);
}
