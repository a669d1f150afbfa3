//! Errors raised while reading or writing `config.ron`.

/// Failure modes of the RON-backed configuration store.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config directory or file could not be written.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Serializing the in-memory config failed.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The platform reports no per-user configuration directory.
    #[error("no platform config directory available")]
    NoConfigDir,
}
