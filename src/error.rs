//! Error types for the mock core and its configuration layer.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors returned when addressing registers or applying directives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unrecognized directive verb: '{verb}'")]
    UnrecognizedDirective { verb: String },

    #[error("malformed directive '{directive}': {reason}")]
    MalformedDirective { directive: String, reason: String },

    #[error("register index {index} out of range (limit {limit})")]
    OutOfRangeRegister { index: usize, limit: usize },
}

impl CoreError {
    pub(crate) fn malformed(directive: &str, reason: impl Into<String>) -> Self {
        CoreError::MalformedDirective {
            directive: directive.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading a core from a JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid port count {0}: a core needs at least one port")]
    InvalidPortCount(usize),

    #[error("initial value for {group} port {port}: {source}")]
    InitialValue {
        group: String,
        port: usize,
        #[source]
        source: CoreError,
    },

    #[error("directive #{position} rejected: {source}")]
    Directive {
        position: usize,
        #[source]
        source: CoreError,
    },
}
