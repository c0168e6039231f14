use std::path::PathBuf;
use thiserror::Error;

/// Failures the installer reports by kind. Plain I/O errors travel as
/// `anyhow` context chains instead.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Malformed or conflicting command-line arguments.
    #[error("{0}")]
    Usage(String),

    #[error("Unknown agent: {agent}")]
    UnknownAgent { agent: String },

    #[error("No template found for {agent} at {}", .path.display())]
    MissingTemplate { agent: String, path: PathBuf },

    /// A config file exists and is non-empty but is not a YAML mapping.
    #[error("Failed to parse {kind} config at {}: {reason}", .path.display())]
    ConfigParse {
        kind: ConfigKind,
        path: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Template,
    Existing,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template => f.write_str("template"),
            Self::Existing => f.write_str("existing"),
        }
    }
}

impl InstallError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}
