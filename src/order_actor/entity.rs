use chrono::Utc;

use super::actions::{OrderAction, OrderActionResult};
use crate::actor_framework::Entity;
use crate::domain::{
    Order, OrderCreate, OrderStatus, PaymentDetails, PaymentMethod, PaymentStatus, TrackingEntry,
};

impl Entity for Order {
    const KIND: &'static str = "order";

    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order from a priced order.
    ///
    /// # Notes
    /// The order is initialized with status `order_placed`; the first tracking
    /// entry is added by `on_create`.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, String> {
        if params.order_number.is_empty() {
            return Err("Order number is required".to_string());
        }
        if params.items.is_empty() {
            return Err("Order must contain at least one item".to_string());
        }
        let now = Utc::now();
        let total = params.subtotal - params.discount + params.delivery_charge;
        Ok(Self {
            id,
            order_number: params.order_number,
            user_id: params.user_id,
            items: params.items,
            shipping_details: params.shipping_details,
            subtotal: params.subtotal,
            discount: params.discount,
            promo_code: params.promo_code,
            delivery_charge: params.delivery_charge,
            total,
            payment: PaymentDetails {
                method: params.payment_method,
                status: PaymentStatus::Pending,
                reference: None,
            },
            status: OrderStatus::OrderPlaced,
            tracking_history: Vec::new(),
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.order_number.clone())
    }

    fn on_create(&mut self) -> Result<(), String> {
        self.tracking_history.push(TrackingEntry {
            status: self.status,
            message: self.status.tracking_message().to_string(),
            timestamp: self.created_at,
        });
        Ok(())
    }

    /// Orders are never edited in place; every change is an action.
    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("Orders can only be changed through status or payment updates".to_string())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("Orders cannot be deleted".to_string())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, String> {
        match action {
            // The note doubles as the recorded cancellation reason.
            OrderAction::UpdateStatus { status: OrderStatus::Cancelled, note, at } => {
                self.cancel(note.clone(), note, at)?;
                Ok(OrderActionResult::UpdateStatus(self.clone()))
            }
            OrderAction::UpdateStatus { status, note, at } => {
                self.transition(status, note, at)?;
                Ok(OrderActionResult::UpdateStatus(self.clone()))
            }
            OrderAction::Cancel { reason, at } => {
                if !self.status.is_cancellable() {
                    return Err(format!("Order cannot be cancelled once it is {}", self.status));
                }
                self.cancel(reason, None, at)?;
                Ok(OrderActionResult::Cancel(self.clone()))
            }
            OrderAction::RecordPayment { status, reference } => {
                if self.status == OrderStatus::Cancelled && status == PaymentStatus::Paid {
                    return Err("Cannot record a payment on a cancelled order".to_string());
                }
                self.payment.status = status;
                if reference.is_some() {
                    self.payment.reference = reference;
                }
                self.updated_at = Utc::now();
                Ok(OrderActionResult::RecordPayment(self.clone()))
            }
        }
    }
}

impl Order {
    fn cancel(
        &mut self,
        reason: Option<String>,
        note: Option<String>,
        at: chrono::DateTime<Utc>,
    ) -> Result<(), String> {
        self.transition(OrderStatus::Cancelled, note, at)?;
        self.cancellation_reason = reason;
        if self.payment.status == PaymentStatus::Paid && self.payment.method == PaymentMethod::Online {
            self.payment.status = PaymentStatus::Refunded;
        }
        Ok(())
    }
}
