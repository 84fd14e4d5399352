use thiserror::Error;

/// Unified error type for the classification core.
///
/// Normalization failures are deliberately absent: a stemmer error on one
/// token is recovered inside the normalizer and never surfaces.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Request rejected before any classification ran.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Model, tokenizer or label map failed to load at startup. Fatal to
    /// serving; the service reports itself degraded instead of retrying.
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// The model call itself failed at request time. Surfaced to the
    /// caller as a server error; never retried internally.
    #[error("Model inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
