//! Domain error types.

/// Top-level error type for signalforge.
#[derive(Debug, thiserror::Error)]
pub enum SignalforgeError {
    #[error("empty series for {ticker}: no bars supplied")]
    EmptySeries { ticker: String },

    #[error("missing input column {column}")]
    MissingInput { column: String },

    #[error("missing indicator column {column} (was the indicator engine run?)")]
    MissingColumn { column: String },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SignalforgeError> for std::process::ExitCode {
    fn from(err: &SignalforgeError) -> Self {
        let code: u8 = match err {
            SignalforgeError::Io(_) => 1,
            SignalforgeError::ConfigParse { .. }
            | SignalforgeError::ConfigMissing { .. }
            | SignalforgeError::ConfigInvalid { .. }
            | SignalforgeError::UnknownStrategy { .. } => 2,
            SignalforgeError::Data { .. }
            | SignalforgeError::Database { .. }
            | SignalforgeError::DatabaseQuery { .. } => 3,
            SignalforgeError::MissingInput { .. }
            | SignalforgeError::MissingColumn { .. }
            | SignalforgeError::InvalidFrame { .. }
            | SignalforgeError::LengthMismatch { .. } => 4,
            SignalforgeError::EmptySeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
