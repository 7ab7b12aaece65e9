//! Review store logic.

pub mod entity;
pub mod error;

pub use error::*;
