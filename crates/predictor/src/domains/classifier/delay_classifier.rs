use crate::{FeatureVector, SchemaMismatch};

#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode model: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported model: {0}")]
    Unsupported(String),
    #[error("malformed model: {0}")]
    Malformed(String),
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
}

/// Opaque scoring capability; the backend can change without touching
/// feature assembly.
#[cfg_attr(test, mockall::automock)]
pub trait DelayClassifier: Send + Sync {
    /// Probability of the "delayed" class, in `[0, 1]`
    fn score(&self, features: &FeatureVector) -> Result<f64, ClassifierError>;
}
