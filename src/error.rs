use std::path::PathBuf;
use thiserror::Error;

/// Failures coming out of a frame source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read frames: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// The recognizer failed on one frame. Not fatal to a session.
    #[error("detector failed: {message}")]
    Detector { message: String },
}

impl SourceError {
    pub fn detector(message: impl Into<String>) -> Self {
        SourceError::Detector {
            message: message.into(),
        }
    }

    /// Whether the frame can be treated as empty and the stream continued.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SourceError::Detector { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
