//! Error types for the slatebar workspace.

use std::path::PathBuf;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the panel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested configuration file does not exist.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Failed to read a configuration file.
    #[error("failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration validation failed.
    #[error("config validation failed:\n{}", .0.join("\n"))]
    ConfigValidation(Vec<String>),

    /// A status-area role already has an active widget.
    #[error("extension point conflict: there is already a status widget for role `{0}`")]
    RoleConflict(String),

    /// A widget handed to the status area does not satisfy the
    /// panel-button contract.
    #[error("status widget for role `{0}` must be a PanelButton")]
    CapabilityViolation(String),
}
