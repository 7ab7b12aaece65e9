use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PromoCodeError {
    #[error("Invalid promo code")]
    UnknownCode(String),
    #[error("Promo code not found: {0}")]
    NotFound(String),
    #[error("Promo code already exists: {0}")]
    AlreadyExists(String),
    /// Applicability failure, carrying the customer-facing reason.
    #[error("{0}")]
    NotApplicable(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for PromoCodeError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(what) => PromoCodeError::NotFound(what),
            FrameworkError::Duplicate(what) => PromoCodeError::AlreadyExists(what),
            FrameworkError::Rejected(reason) => PromoCodeError::ValidationError(reason),
            other => PromoCodeError::ActorCommunicationError(other.to_string()),
        }
    }
}
