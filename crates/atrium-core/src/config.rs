use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::StoreMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            analytics: AnalyticsConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub mode: StoreMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Window, in days, for recent-activity productivity counts.
    #[serde(default = "default_productivity_window_days")]
    pub productivity_window_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            productivity_window_days: default_productivity_window_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
        }
    }
}

/// Load configuration from `<root>/atrium.toml`; a missing file means
/// defaults.
pub fn load_config(root: &Path) -> Result<SuiteConfig> {
    let path = root.join("atrium.toml");
    if !path.exists() {
        return Ok(SuiteConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<SuiteConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_productivity_window_days() -> u32 {
    7
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(".atrium")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_config(dir.path()).expect("load should succeed");
        assert_eq!(cfg.store.mode, StoreMode::Strict);
        assert_eq!(cfg.analytics.productivity_window_days, 7);
        assert_eq!(cfg.snapshot.dir, PathBuf::from(".atrium"));
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("atrium.toml"),
            "[store]\nmode = \"lenient\"\n",
        )
        .expect("write config");

        let cfg = load_config(dir.path()).expect("load should succeed");
        assert_eq!(cfg.store.mode, StoreMode::Lenient);
        assert_eq!(cfg.analytics.productivity_window_days, 7);
    }

    #[test]
    fn invalid_config_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("atrium.toml"), "store = 5\n").expect("write config");

        let err = load_config(dir.path()).expect_err("parse should fail");
        assert!(err.to_string().contains("atrium.toml"));
    }
}
