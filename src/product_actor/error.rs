use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product is not available: {0}")]
    Unavailable(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    InsufficientStock(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ProductError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(what) => ProductError::NotFound(what),
            FrameworkError::Rejected(reason) | FrameworkError::Duplicate(reason) => {
                ProductError::ValidationError(reason)
            }
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
