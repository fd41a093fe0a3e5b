//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! A `LogConfig` is an immutable snapshot: it is consumed when a logger is
//! built and again on every reload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Output encoding of the full backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One JSON object per line.
    Json,
    /// Human readable text lines.
    #[default]
    Human,
}

/// Root logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output encoding.
    pub encoding: Encoding,

    /// Default level name; unrecognized names mean "info".
    pub level: String,

    /// Per-component level overrides keyed by dotted component path.
    pub component_levels: HashMap<String, String>,

    /// Where lines go: "stderr", "stdout" or a file path.
    pub output: String,

    /// Wrap freshly built loggers in the startup sampler.
    pub sample_enabled: bool,

    /// Entries per window that always pass the sampler; the startup
    /// sampler reads 0 as 20.
    pub sample_initial_burst: u64,

    /// After the burst, every Nth entry passes; 0 drops the rest, except in
    /// the startup sampler, which reads 0 as 100.
    pub sample_steady_interval: u64,

    /// Window of the per-item sampler in seconds; 0 disables it.
    pub sample_window_seconds: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Human,
            level: "info".to_string(),
            component_levels: HashMap::new(),
            output: default_output(),
            sample_enabled: false,
            sample_initial_burst: 0,
            sample_steady_interval: 0,
            sample_window_seconds: 0,
        }
    }
}

fn default_output() -> String {
    "stderr".to_string()
}

impl LogConfig {
    /// Shortcut used by the demo binary and tests.
    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }

    /// Builder-style component override.
    pub fn component(mut self, path: &str, level: &str) -> Self {
        self.component_levels
            .insert(path.to_string(), level.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.encoding, Encoding::Human);
        assert_eq!(config.level, "info");
        assert_eq!(config.output, "stderr");
        assert!(config.component_levels.is_empty());
        assert!(!config.sample_enabled);
        assert_eq!(config.sample_window_seconds, 0);
    }

    #[test]
    fn test_minimal_toml() {
        let config: LogConfig = toml::from_str(
            r#"
            encoding = "json"
            level = "debug"

            [component_levels]
            "svc.media" = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(config.level, "debug");
        assert_eq!(config.component_levels["svc.media"], "warn");
        assert_eq!(config.output, "stderr");
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let res: Result<LogConfig, _> = toml::from_str(r#"encoding = "xml""#);
        assert!(res.is_err());
    }
}
