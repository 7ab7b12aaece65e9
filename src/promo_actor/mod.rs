//! Promo-code store logic: validation, atomic redemption and release.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
