use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    #[error("Review not found: {0}")]
    NotFound(String),
    #[error("Product not found: {0}")]
    UnknownProduct(String),
    #[error("You have already reviewed this product")]
    AlreadyReviewed,
    #[error("Not allowed to delete this review")]
    Forbidden,
    #[error("{0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ReviewError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(what) => ReviewError::NotFound(what),
            FrameworkError::Duplicate(_) => ReviewError::AlreadyReviewed,
            FrameworkError::Rejected(reason) => ReviewError::ValidationError(reason),
            other => ReviewError::ActorCommunicationError(other.to_string()),
        }
    }
}
