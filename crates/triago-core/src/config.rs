use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TriagoError;

/// Top-level configuration loaded from `.triago.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use triago_core::TriagoConfig;
///
/// let config = TriagoConfig::default();
/// assert_eq!(config.report.limit, 20);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriagoConfig {
    /// Snapshot source settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Report rendering settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl TriagoConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TriagoError::Io`] if the file cannot be read, or
    /// [`TriagoError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use triago_core::TriagoConfig;
    /// use std::path::Path;
    ///
    /// let config = TriagoConfig::from_file(Path::new(".triago.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, TriagoError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`TriagoError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use triago_core::TriagoConfig;
    ///
    /// let toml = r#"
    /// [report]
    /// limit = 5
    /// "#;
    /// let config = TriagoConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.report.limit, 5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, TriagoError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Where the historical snapshot is read from.
///
/// # Examples
///
/// ```
/// use triago_core::SnapshotConfig;
/// use std::path::PathBuf;
///
/// let config = SnapshotConfig::default();
/// assert_eq!(config.path, PathBuf::from("snapshot.json"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Path to the JSON snapshot file (default: `snapshot.json`).
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("snapshot.json")
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

/// Report rendering behavior.
///
/// # Examples
///
/// ```
/// use triago_core::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert_eq!(config.limit, 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum rows shown for hotspot and assignment listings (default: 20).
    #[serde(default = "default_report_limit")]
    pub limit: usize,
}

fn default_report_limit() -> usize {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: default_report_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = TriagoConfig::default();
        assert_eq!(config.snapshot.path, PathBuf::from("snapshot.json"));
        assert_eq!(config.report.limit, 20);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[snapshot]
path = "data/history.json"
"#;
        let config = TriagoConfig::from_toml(toml).unwrap();
        assert_eq!(config.snapshot.path, PathBuf::from("data/history.json"));
        assert_eq!(config.report.limit, 20);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[snapshot]
path = "/var/lib/triago/snapshot.json"

[report]
limit = 50
"#;
        let config = TriagoConfig::from_toml(toml).unwrap();
        assert_eq!(
            config.snapshot.path,
            PathBuf::from("/var/lib/triago/snapshot.json")
        );
        assert_eq!(config.report.limit, 50);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = TriagoConfig::from_toml("").unwrap();
        assert_eq!(config.snapshot.path, PathBuf::from("snapshot.json"));
        assert_eq!(config.report.limit, 20);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = TriagoConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }
}
