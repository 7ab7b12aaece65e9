//! Hand-written service actors with their own message enums.

mod notification_service;

pub use notification_service::*;
