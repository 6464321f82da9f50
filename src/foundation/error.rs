/// Convenience result type used across cliptrack.
pub type CliptrackResult<T> = Result<T, CliptrackError>;

/// Error taxonomy for the I/O and configuration boundaries of the engine.
///
/// Editing verbs never return this type; they report failure as `false`, `None` or `0`.
#[derive(thiserror::Error, Debug)]
pub enum CliptrackError {
    /// Invalid user-provided value or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliptrackError {
    /// Build a [`CliptrackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CliptrackError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CliptrackError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
