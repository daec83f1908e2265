use thiserror::Error;

/// Failures from the fallible edges of the toolkit: reading files,
/// decoding images, parsing configuration.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse RON {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Error returned by an event subscriber. Captured at the subscriber
/// boundary; never aborts a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl From<&str> for HandlerError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

impl From<String> for HandlerError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

/// Result type returned by every event subscriber.
pub type HandlerResult = Result<(), HandlerError>;
