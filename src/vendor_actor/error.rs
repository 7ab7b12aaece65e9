use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VendorError {
    #[error("Vendor not found: {0}")]
    NotFound(String),
    #[error("Vendor already exists: {0}")]
    AlreadyExists(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for VendorError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(what) => VendorError::NotFound(what),
            FrameworkError::Duplicate(what) => VendorError::AlreadyExists(what),
            FrameworkError::Rejected(reason) => VendorError::ValidationError(reason),
            other => VendorError::ActorCommunicationError(other.to_string()),
        }
    }
}
