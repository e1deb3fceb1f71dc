use crate::alarm::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Alarm not found: {name}")]
    NotFound { name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid alarm batch ({} violations)", .0.len())]
    InvalidBatch(#[from] ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}
