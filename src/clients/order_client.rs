use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::{CartClient, NotificationClient, ProductClient, PromoClient, UserClient};
use crate::actor_framework::ResourceClient;
use crate::domain::{
    format_rupees, ApplicabilityRequest, ItemCustomization, NotificationDraft, NotificationKind, Order,
    OrderCreate, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, PromoLine, ShippingDetails, User,
};
use crate::mailer::{send_in_background, Email, SharedMailer};
use crate::order_actor::{OrderAction, OrderError};
use crate::product_actor::ProductError;
use crate::promo_actor::PromoCodeError;

/// Store-wide pricing and stock alert settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    pub delivery_charge: f64,
    pub free_delivery_threshold: f64,
    pub low_stock_threshold: u32,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            delivery_charge: 99.0,
            free_delivery_threshold: 999.0,
            low_stock_threshold: 5,
        }
    }
}

impl PricingRules {
    pub fn delivery_charge_for(&self, discounted_subtotal: f64) -> f64 {
        if discounted_subtotal >= self.free_delivery_threshold {
            0.0
        } else {
            self.delivery_charge
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub customization: ItemCustomization,
}

/// Checkout request as sent by the customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub items: Vec<OrderLineRequest>,
    pub shipping_details: ShippingDetails,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub promo_code: Option<String>,
}

/// Client for interacting with the Order actor.
///
/// This client handles complex orchestration: checkout touches users,
/// products, promo codes and carts, and undoes its own stock and promo
/// reservations when a later step fails.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
    product_client: ProductClient,
    promo_client: PromoClient,
    cart_client: CartClient,
    notifier: NotificationClient,
    mailer: SharedMailer,
    rules: PricingRules,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inner: ResourceClient<Order>,
        user_client: UserClient,
        product_client: ProductClient,
        promo_client: PromoClient,
        cart_client: CartClient,
        notifier: NotificationClient,
        mailer: SharedMailer,
        rules: PricingRules,
    ) -> Self {
        Self {
            inner,
            user_client,
            product_client,
            promo_client,
            cart_client,
            notifier,
            mailer,
            rules,
        }
    }

    #[instrument(skip(self, request), fields(user_id = %user_id, items = request.items.len()))]
    pub async fn place_order(&self, user_id: String, request: PlaceOrder) -> Result<Order, OrderError> {
        info!("Processing place_order request (Client Side)");
        let now = Utc::now();

        // Step 1: Validate user
        let user = match self.user_client.get_user(user_id.clone()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                error!("User not found");
                return Err(OrderError::InvalidUser(user_id));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(OrderError::InvalidUser(format!("User validation failed: {}", e)));
            }
        };

        if request.items.is_empty() {
            return Err(OrderError::ValidationError("Order must contain at least one item".to_string()));
        }
        request
            .shipping_details
            .validate(now.date_naive())
            .map_err(OrderError::ValidationError)?;

        // Step 2: Validate and price every line
        let items = self.price_items(request.items).await?;

        // Step 3: Reserve stock, undoing partial reservations on failure
        let mut reserved: Vec<(String, u32)> = Vec::with_capacity(items.len());
        let mut remaining: Vec<(String, u32)> = Vec::with_capacity(items.len());
        for item in &items {
            match self.product_client.reserve_stock(item.product_id.clone(), item.quantity).await {
                Ok(left) => {
                    reserved.push((item.product_id.clone(), item.quantity));
                    remaining.push((item.name.clone(), left));
                }
                Err(e) => {
                    error!(product_id = %item.product_id, error = %e, "Stock reservation failed");
                    self.product_client.release_all(&reserved).await;
                    return Err(match e {
                        ProductError::InsufficientStock(reason) => OrderError::InsufficientStock(reason),
                        other => OrderError::InvalidProduct(other.to_string()),
                    });
                }
            }
        }
        info!("Stock reserved successfully");

        // Step 4: Redeem the promo code against the subtotal
        let subtotal: f64 = items.iter().map(OrderItem::line_total).sum();
        let order_number = Order::new_order_number(now);
        let (promo_code, discount) = match request.promo_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                let applicability = ApplicabilityRequest {
                    total_amount: subtotal,
                    items: promo_lines(&items),
                    user_id: user.id.clone(),
                };
                match self
                    .promo_client
                    .redeem(code.to_string(), applicability, order_number.clone(), now)
                    .await
                {
                    Ok((promo, discount)) => (Some(promo.code), discount),
                    Err(e) => {
                        warn!(error = %e, "Promo code redemption failed");
                        self.product_client.release_all(&reserved).await;
                        return Err(match e {
                            PromoCodeError::UnknownCode(_) | PromoCodeError::NotApplicable(_) => {
                                OrderError::InvalidPromoCode(e.to_string())
                            }
                            other => OrderError::ActorCommunicationError(other.to_string()),
                        });
                    }
                }
            }
            _ => (None, 0.0),
        };

        // Step 5: Store the order
        let payload = OrderCreate {
            order_number: order_number.clone(),
            user_id: user.id.clone(),
            items,
            shipping_details: request.shipping_details,
            subtotal,
            discount,
            promo_code: promo_code.clone(),
            delivery_charge: self.rules.delivery_charge_for(subtotal - discount),
            payment_method: request.payment_method,
        };
        let stored = match self.inner.create(payload).await {
            Ok(id) => self.get_order(id.clone()).await.and_then(|o| o.ok_or(OrderError::NotFound(id))),
            Err(e) => Err(e.into()),
        };
        let order = match stored {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "Order creation failed, rolling back");
                if let Some(code) = promo_code {
                    self.release_promo(code, order_number).await;
                }
                self.product_client.release_all(&reserved).await;
                return Err(e);
            }
        };
        info!(order_id = %order.id, order_number = %order.order_number, total = order.total, "Order placed");

        // Step 6: Side effects; failures here never fail the order
        self.publish(
            NotificationDraft::new(
                NotificationKind::NewOrder,
                "New order received",
                format!("Order {} placed for ₹{}", order.order_number, format_rupees(order.total)),
            )
            .for_order(order.id.clone()),
        )
        .await;
        for (name, left) in remaining {
            if left <= self.rules.low_stock_threshold {
                self.publish(NotificationDraft::new(
                    NotificationKind::LowStock,
                    "Low stock alert",
                    format!("{} has only {} left in stock", name, left),
                ))
                .await;
            }
        }
        send_in_background(&self.mailer, Email::order_confirmation(&user.email, &user.name, &order));
        if let Err(e) = self.cart_client.clear(user.id.clone()).await {
            warn!(error = %e, "Failed to clear cart after checkout");
        }

        Ok(order)
    }

    async fn price_items(&self, lines: Vec<OrderLineRequest>) -> Result<Vec<OrderItem>, OrderError> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity == 0 {
                return Err(OrderError::ValidationError("Quantity must be at least 1".to_string()));
            }
            let product = match self.product_client.require_available(line.product_id.clone()).await {
                Ok(product) => product,
                Err(e) => {
                    error!(product_id = %line.product_id, error = %e, "Product validation failed");
                    return Err(OrderError::InvalidProduct(e.to_string()));
                }
            };
            let unit_price = product
                .unit_price(&line.customization)
                .map_err(OrderError::ValidationError)?;
            items.push(OrderItem {
                product_id: product.id,
                name: product.name,
                category: product.category,
                quantity: line.quantity,
                unit_price,
                customization: line.customization,
            });
        }
        Ok(items)
    }

    /// An order visible to `requester`: their own, or any for admins.
    #[instrument(skip(self, requester), fields(user_id = %requester.id))]
    pub async fn get_for(&self, id: String, requester: &User) -> Result<Order, OrderError> {
        let order = self.get_order(id.clone()).await?.ok_or(OrderError::NotFound(id))?;
        if order.user_id != requester.id && !requester.is_admin() {
            return Err(OrderError::Forbidden("Not authorized to view this order".to_string()));
        }
        Ok(order)
    }

    /// The user's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: String) -> Result<Vec<Order>, OrderError> {
        let mut orders = self
            .inner
            .find(move |o: &Order| o.user_id == user_id)
            .await
            .map_err(OrderError::from)?;
        newest_first(&mut orders);
        Ok(orders)
    }

    /// Every order, newest first, optionally only those in `status`.
    #[instrument(skip(self))]
    pub async fn list_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        let mut orders = self
            .inner
            .find(move |o: &Order| status.map_or(true, |s| o.status == s))
            .await
            .map_err(OrderError::from)?;
        newest_first(&mut orders);
        Ok(orders)
    }

    #[instrument(skip(self, note))]
    pub async fn update_status(&self, id: String, status: OrderStatus, note: Option<String>) -> Result<Order, OrderError> {
        let action = OrderAction::UpdateStatus { status, note, at: Utc::now() };
        let order = self.inner.perform_action(id, action).await.map_err(OrderError::from)?.into_order();
        info!(order_number = %order.order_number, status = %order.status, "Order status updated");
        self.after_status_change(&order).await;
        Ok(order)
    }

    /// Cancels an order on behalf of its owner or an admin.
    #[instrument(skip(self, requester, reason), fields(user_id = %requester.id))]
    pub async fn cancel(&self, id: String, requester: &User, reason: Option<String>) -> Result<Order, OrderError> {
        let order = self.get_for(id.clone(), requester).await?;
        if !order.status.is_cancellable() {
            return Err(OrderError::ValidationError(format!(
                "Order cannot be cancelled once it is {}",
                order.status
            )));
        }
        let action = OrderAction::Cancel { reason, at: Utc::now() };
        let order = self.inner.perform_action(id, action).await.map_err(OrderError::from)?.into_order();
        info!(order_number = %order.order_number, "Order cancelled");
        self.after_status_change(&order).await;
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        id: String,
        status: PaymentStatus,
        reference: Option<String>,
    ) -> Result<Order, OrderError> {
        let action = OrderAction::RecordPayment { status, reference };
        let order = self.inner.perform_action(id, action).await.map_err(OrderError::from)?.into_order();
        Ok(order)
    }

    /// Notifies admins and the customer, and returns stock and promo uses
    /// held by a cancelled order.
    async fn after_status_change(&self, order: &Order) {
        if order.status == OrderStatus::Cancelled {
            let held: Vec<(String, u32)> = order
                .items
                .iter()
                .map(|item| (item.product_id.clone(), item.quantity))
                .collect();
            self.product_client.release_all(&held).await;
            if let Some(code) = order.promo_code.clone() {
                self.release_promo(code, order.order_number.clone()).await;
            }
        }

        self.publish(
            NotificationDraft::new(
                NotificationKind::OrderStatus,
                "Order status updated",
                format!("Order {} is now {}", order.order_number, order.status),
            )
            .for_order(order.id.clone()),
        )
        .await;

        match self.user_client.get_user(order.user_id.clone()).await {
            Ok(Some(user)) => send_in_background(&self.mailer, Email::status_update(&user.email, &user.name, order)),
            Ok(None) => warn!(user_id = %order.user_id, "Order owner no longer exists"),
            Err(e) => warn!(error = %e, "Failed to look up order owner"),
        }
    }

    async fn release_promo(&self, code: String, order_number: String) {
        match self.promo_client.release(code, order_number).await {
            Ok(true) => info!("Promo code use released"),
            Ok(false) => warn!("No promo redemption to release"),
            Err(e) => error!(error = %e, "Failed to release promo code use"),
        }
    }

    async fn publish(&self, draft: NotificationDraft) {
        if let Err(e) = self.notifier.publish(draft).await {
            warn!(error = %e, "Failed to publish notification");
        }
    }
}

/// Per-line amounts for promo category checks.
pub(crate) fn promo_lines(items: &[OrderItem]) -> Vec<PromoLine> {
    items
        .iter()
        .map(|item| PromoLine {
            category: item.category.clone(),
            amount: item.line_total(),
        })
        .collect()
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
