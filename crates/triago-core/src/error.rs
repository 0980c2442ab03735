use std::path::PathBuf;

/// Errors that can occur across the Triago platform.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the
/// boundary. The analytics entry points themselves never surface this type —
/// they catch [`TriagoError::Store`] internally and fall back to the
/// documented defaults.
///
/// # Examples
///
/// ```
/// use triago_core::TriagoError;
///
/// let err = TriagoError::Config("missing snapshot path".into());
/// assert!(err.to_string().contains("missing snapshot path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TriagoError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Historical-record store query failure.
    #[error("store error: {0}")]
    Store(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required snapshot file was not found.
    #[error("snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),
}
