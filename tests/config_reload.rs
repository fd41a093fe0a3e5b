//! File based config loading and hot reload.

use std::fs;
use std::time::Duration;

use opslog::config::{load_config, ConfigWatcher};
use opslog::{Encoding, Level, Logger};

mod common;

#[test]
fn test_logger_from_loaded_config() {
    let path = common::scratch_path("from-file.toml");
    let output = common::scratch_path("from-file.log");
    let _ = fs::remove_file(&output);
    fs::write(
        &path,
        format!(
            "encoding = \"json\"\nlevel = \"warn\"\noutput = {:?}\n\n[component_levels]\ndb = \"debug\"\n",
            output.to_string_lossy()
        ),
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.encoding, Encoding::Json);

    let logger = Logger::from_config(&config).unwrap().with_name("svc");
    logger.info("dropped", &[]);
    logger.with_component("db").debug("kept", &opslog::fields!["conns" => 4]);

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let line: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(line["message"], "kept");
    assert_eq!(line["logger"], "svc.db");

    let _ = fs::remove_file(path);
    let _ = fs::remove_file(output);
}

#[tokio::test]
async fn test_watcher_delivers_updates() {
    let path = common::scratch_path("watched.toml");
    fs::write(&path, "level = \"info\"\n").unwrap();

    let (_, logger) = common::memory_logger(&load_config(&path).unwrap());
    let db = logger.with_component("db");
    assert_eq!(db.level(), Level::Info);

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(&path, "level = \"info\"\n\n[component_levels]\ndb = \"error\"\n").unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let update = tokio::time::timeout_at(deadline, updates.recv())
            .await
            .expect("no config update received")
            .expect("watcher channel closed");
        logger.registry().on_config_reload(&update);
        if db.level() == Level::Error {
            break;
        }
    }

    let _ = fs::remove_file(path);
}
