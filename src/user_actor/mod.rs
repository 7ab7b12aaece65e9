//! User store logic: registration, profile updates and the wishlist.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
