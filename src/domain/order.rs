use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ItemCustomization;

/// Lifecycle of an order, from checkout to doorstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    OrderPlaced,
    Received,
    BeingMade,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::OrderPlaced,
        OrderStatus::Received,
        OrderStatus::BeingMade,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderPlaced => "order_placed",
            OrderStatus::Received => "received",
            OrderStatus::BeingMade => "being_made",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Default tracking message recorded when an order enters this status.
    pub fn tracking_message(&self) -> &'static str {
        match self {
            OrderStatus::OrderPlaced => "Your order has been placed successfully",
            OrderStatus::Received => "Your order has been received by our florist",
            OrderStatus::BeingMade => "Your bouquet is being prepared",
            OrderStatus::OutForDelivery => "Your order is out for delivery",
            OrderStatus::Delivered => "Your order has been delivered",
            OrderStatus::Cancelled => "Your order has been cancelled",
        }
    }

    /// Transition table. Delivered and cancelled are terminal.
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            OrderPlaced => &[Received, Cancelled],
            Received => &[BeingMade, Cancelled],
            BeingMade => &[OutForDelivery, Cancelled],
            OutForDelivery => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub status: OrderStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub customization: ItemCustomization,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub pincode: String,
    pub delivery_date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub instructions: Option<String>,
}

impl ShippingDetails {
    pub fn validate(&self, today: NaiveDate) -> Result<(), String> {
        let required = [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("pincode", &self.pincode),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("Shipping {} is required", field));
        }
        if matches!(self.delivery_date, Some(date) if date < today) {
            return Err("Delivery date cannot be in the past".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub shipping_details: ShippingDetails,
    pub subtotal: f64,
    pub discount: f64,
    pub promo_code: Option<String>,
    pub delivery_charge: f64,
    pub total: f64,
    pub payment: PaymentDetails,
    pub status: OrderStatus,
    pub tracking_history: Vec<TrackingEntry>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Priced order ready to be stored. Built by the order client once stock and
/// promo code have been secured.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub shipping_details: ShippingDetails,
    pub subtotal: f64,
    pub discount: f64,
    pub promo_code: Option<String>,
    pub delivery_charge: f64,
    pub payment_method: PaymentMethod,
}

impl Order {
    /// `ORD-<yymmdd>-<6 random hex digits>`.
    pub fn new_order_number(at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        format!("ORD-{}-{}", at.format("%y%m%d"), suffix)
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Moves the order along the transition table and records the change.
    pub fn transition(&mut self, next: OrderStatus, note: Option<String>, at: DateTime<Utc>) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!("Cannot change order status from {} to {}", self.status, next));
        }
        self.status = next;
        self.updated_at = at;
        self.tracking_history.push(TrackingEntry {
            status: next,
            message: note.unwrap_or_else(|| next.tracking_message().to_string()),
            timestamp: at,
        });
        if next == OrderStatus::Delivered && self.payment.method == PaymentMethod::Cod {
            self.payment.status = PaymentStatus::Paid;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn shipping() -> ShippingDetails {
        ShippingDetails {
            full_name: "Asha Rao".into(),
            phone: "9876543210".into(),
            address: "12 MG Road".into(),
            city: "Bengaluru".into(),
            state: "KA".into(),
            pincode: "560001".into(),
            delivery_date: None,
            time_slot: Some("morning".into()),
            instructions: None,
        }
    }

    pub(crate) fn order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: "order_1".into(),
            order_number: "ORD-1".into(),
            user_id: "user_1".into(),
            items: vec![],
            shipping_details: shipping(),
            subtotal: 500.0,
            discount: 0.0,
            promo_code: None,
            delivery_charge: 0.0,
            total: 500.0,
            payment: PaymentDetails { method: PaymentMethod::Cod, status: PaymentStatus::Pending, reference: None },
            status,
            tracking_history: vec![TrackingEntry {
                status,
                message: status.tracking_message().into(),
                timestamp: now,
            }],
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn happy_path_appends_one_entry_per_step() {
        let mut order = order(OrderStatus::OrderPlaced);
        let steps = [
            OrderStatus::Received,
            OrderStatus::BeingMade,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ];
        for (i, step) in steps.into_iter().enumerate() {
            order.transition(step, None, Utc::now()).unwrap();
            assert_eq!(order.tracking_history.len(), i + 2);
            assert_eq!(order.tracking_history.last().unwrap().message, step.tracking_message());
        }
        assert!(order.status.is_terminal());
        assert_eq!(order.payment.status, PaymentStatus::Paid);
    }

    #[test]
    fn illegal_transitions_are_rejected_without_side_effects() {
        let mut delivered = order(OrderStatus::Delivered);
        let before = delivered.clone();
        let err = delivered.transition(OrderStatus::OrderPlaced, None, Utc::now()).unwrap_err();
        assert_eq!(err, "Cannot change order status from delivered to order_placed");
        assert_eq!(delivered, before);

        let mut placed = order(OrderStatus::OrderPlaced);
        assert!(placed.transition(OrderStatus::OrderPlaced, None, Utc::now()).is_err());
        assert!(placed.transition(OrderStatus::OutForDelivery, None, Utc::now()).is_err());
        assert_eq!(placed.tracking_history.len(), 1);
    }

    #[test]
    fn cancellation_only_before_dispatch() {
        for status in OrderStatus::ALL {
            let expected = matches!(
                status,
                OrderStatus::OrderPlaced | OrderStatus::Received | OrderStatus::BeingMade
            );
            assert_eq!(status.is_cancellable(), expected, "{status}");
        }
    }

    #[test]
    fn admin_note_replaces_default_message() {
        let mut order = order(OrderStatus::OrderPlaced);
        order
            .transition(OrderStatus::Received, Some("Florist Meera accepted".into()), Utc::now())
            .unwrap();
        assert_eq!(order.tracking_history[1].message, "Florist Meera accepted");
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn shipping_requires_fields_and_future_date() {
        let today = Utc::now().date_naive();
        assert!(shipping().validate(today).is_ok());

        let mut missing = shipping();
        missing.pincode = " ".into();
        assert_eq!(missing.validate(today), Err("Shipping pincode is required".to_string()));

        let mut past = shipping();
        past.delivery_date = today.pred_opt();
        assert_eq!(past.validate(today), Err("Delivery date cannot be in the past".to_string()));
    }
}
