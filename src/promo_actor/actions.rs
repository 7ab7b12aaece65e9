use chrono::{DateTime, Utc};

use crate::domain::{ApplicabilityRequest, PromoValidation};

/// Custom actions for PromoCode entities.
#[derive(Debug, Clone)]
pub enum PromoAction {
    /// Checks the code against a cart without consuming it.
    Validate {
        request: ApplicabilityRequest,
        now: DateTime<Utc>,
    },
    /// Checks and consumes one use in a single step. Fails instead of
    /// exceeding the usage limit.
    Redeem {
        request: ApplicabilityRequest,
        order_number: String,
        now: DateTime<Utc>,
    },
    /// Gives back the use consumed by `order_number`, if any.
    Release { order_number: String },
}

/// Results from PromoActions - variants match 1:1 with PromoAction
#[derive(Debug, Clone, PartialEq)]
pub enum PromoActionResult {
    Validate(PromoValidation),
    /// Discount granted
    Redeem(f64),
    /// Whether a redemption was found and released
    Release(bool),
}
