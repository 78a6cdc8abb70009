use thiserror::Error;

/// Failure of a whole extraction run. No partial results accompany it.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    /// The signal or the configuration cannot be analyzed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A transform stage could not be set up (FFT size, filterbank shape).
    #[error("transform failure: {0}")]
    TransformFailure(String),
}

impl FeatureError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        FeatureError::InvalidInput(msg.into())
    }

    pub(crate) fn transform(msg: impl Into<String>) -> Self {
        FeatureError::TransformFailure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;
