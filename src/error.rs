/// Convenience result type used across the label pipeline.
pub type QrLabelResult<T> = Result<T, QrLabelError>;

/// Every failure the pipeline can surface.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QrLabelError {
    /// Missing, malformed or out-of-range input field.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// The text does not fit in a symbol at the requested error-correction level.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Process-wide settings could not be parsed at start-up.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl QrLabelError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Client-error status used by both HTTP front-ends.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 422,
            Self::Encoding(_) => 400,
            Self::Configuration(_) => 500,
        }
    }
}
