//! Server configuration, layered from an optional TOML file and
//! `TRACKER_`-prefixed environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;
use tracker_core::config::TrackerConfig;

/// Top-level configuration for the `tracker` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  /// SQLite file backing the tables. Unset runs on an in-memory store.
  pub store_path:            Option<PathBuf>,
  /// Seconds between scheduled archival passes; `0` disables the scheduler.
  pub archive_interval_secs: u64,
  pub debug:                 DebugConfig,
  pub tracker:               TrackerConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_owned(),
      port:                  8080,
      store_path:            None,
      archive_interval_secs: 3600,
      debug:                 DebugConfig::default(),
      tracker:               TrackerConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Load from `path` (skipped if absent) and the environment. Nested keys
  /// use a double underscore, e.g. `TRACKER_DEBUG__WEBHOOK_URL`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TRACKER")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn archive_interval(&self) -> Option<Duration> {
    (self.archive_interval_secs > 0).then(|| Duration::from_secs(self.archive_interval_secs))
  }

  /// `store_path` with a leading `~` expanded.
  pub fn store_path(&self) -> Option<PathBuf> { self.store_path.as_deref().map(expand_tilde) }
}

/// Debug notifications for every accepted submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
  pub enabled:     bool,
  /// Where to POST notifications. Unset logs them instead.
  pub webhook_url: Option<String>,
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/tracker.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.archive_interval(), Some(Duration::from_secs(3600)));
    assert!(cfg.store_path.is_none());
    assert!(!cfg.debug.enabled);
    assert_eq!(cfg.tracker.lock_timeout_secs, 30);
  }

  #[test]
  fn toml_overrides_nested_tracker_settings() {
    let path = std::env::temp_dir().join(format!("tracker-config-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
      file,
      r#"
port = 9000
archive_interval_secs = 0

[debug]
enabled = true

[tracker]
lock_timeout_secs = 5

[tracker.tables]
summary = "Audit Summary"
"#
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.archive_interval(), None);
    assert!(cfg.debug.enabled);
    assert_eq!(cfg.tracker.lock_timeout_secs, 5);
    assert_eq!(cfg.tracker.tables.summary, "Audit Summary");
    assert_eq!(cfg.tracker.tables.panel, "Non-compliant Panel Installations");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/t.db")), PathBuf::from(home).join("t.db"));
    assert_eq!(expand_tilde(Path::new("/abs/t.db")), PathBuf::from("/abs/t.db"));
  }
}
