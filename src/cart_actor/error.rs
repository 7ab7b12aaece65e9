use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart not found: {0}")]
    NotFound(String),
    #[error("Cart item not found")]
    LineNotFound(String),
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for CartError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(what) => CartError::NotFound(what),
            FrameworkError::Rejected(reason) | FrameworkError::Duplicate(reason) => CartError::ValidationError(reason),
            other => CartError::ActorCommunicationError(other.to_string()),
        }
    }
}
