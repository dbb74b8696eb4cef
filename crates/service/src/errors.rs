use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("transaction failed: {0}")]
    TransactionFailure(String),
    #[error("upload error: {0}")]
    Upload(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 1003,
            ServiceError::Db(_) => 1200,
            ServiceError::TransactionFailure(_) => 1201,
            ServiceError::Upload(_) => 1300,
            ServiceError::Model(_) => 1400,
        }
    }
}
