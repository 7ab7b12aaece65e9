use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderStatus, PaymentStatus};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to `status`, validated against the transition table.
    UpdateStatus {
        status: OrderStatus,
        note: Option<String>,
        at: DateTime<Utc>,
    },
    /// Cancels an order that has not left the shop yet.
    Cancel {
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    RecordPayment {
        status: PaymentStatus,
        reference: Option<String>,
    },
}

/// Results from OrderActions - each returns the order as stored afterwards
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    UpdateStatus(Order),
    Cancel(Order),
    RecordPayment(Order),
}

impl OrderActionResult {
    pub fn into_order(self) -> Order {
        match self {
            OrderActionResult::UpdateStatus(order)
            | OrderActionResult::Cancel(order)
            | OrderActionResult::RecordPayment(order) => order,
        }
    }
}
