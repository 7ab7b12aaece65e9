use tracing::{debug, instrument};
use uuid::Uuid;

use super::ProductClient;
use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::cart_actor::{CartAction, CartError};
use crate::domain::{Cart, CartCreate, CartLine, ItemCustomization};
use crate::product_actor::ProductError;

/// Client for the Cart actor. Prices lines from the current catalog.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
    product_client: ProductClient,
}

impl_client_methods!(CartClient, Cart, CartError, cart);

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>, product_client: ProductClient) -> Self {
        Self { inner, product_client }
    }

    async fn find_for(&self, user_id: &str) -> Result<Option<Cart>, CartError> {
        let user_id = user_id.to_string();
        let mut carts = self
            .inner
            .find(move |cart: &Cart| cart.user_id == user_id)
            .await
            .map_err(CartError::from)?;
        Ok(carts.pop())
    }

    /// The user's cart, created on first use.
    #[instrument(skip(self))]
    pub async fn cart_for(&self, user_id: String) -> Result<Cart, CartError> {
        if let Some(cart) = self.find_for(&user_id).await? {
            return Ok(cart);
        }
        debug!("Creating cart");
        match self.inner.create(CartCreate { user_id: user_id.clone() }).await {
            Ok(id) => self.get_cart(id.clone()).await?.ok_or(CartError::NotFound(id)),
            // Another request created it first.
            Err(FrameworkError::Duplicate(_)) => self
                .find_for(&user_id)
                .await?
                .ok_or(CartError::NotFound(user_id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, customization))]
    pub async fn add_item(
        &self,
        user_id: String,
        product_id: String,
        quantity: u32,
        customization: ItemCustomization,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::ValidationError("Quantity must be at least 1".to_string()));
        }
        let product = self.product_client.require_available(product_id.clone()).await?;
        let unit_price = product
            .unit_price(&customization)
            .map_err(CartError::ValidationError)?;

        let cart = self.cart_for(user_id).await?;
        let wanted = cart.quantity_of(&product_id, None).checked_add(quantity);
        ensure_in_stock(&product.name, product.stock, wanted)?;

        let line = CartLine {
            line_id: Uuid::new_v4().to_string(),
            product_id,
            name: product.name,
            quantity,
            unit_price,
            customization,
        };
        self.apply(cart.id, CartAction::AddLine(line)).await
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(&self, user_id: String, line_id: String, quantity: u32) -> Result<Cart, CartError> {
        let cart = self.cart_for(user_id).await?;
        if quantity > 0 {
            let line = cart
                .lines
                .iter()
                .find(|l| l.line_id == line_id)
                .ok_or_else(|| CartError::LineNotFound(line_id.clone()))?;
            let stock = self.product_client.check_stock(line.product_id.clone()).await?;
            // Other lines of the same product count against the same stock.
            let wanted = cart.quantity_of(&line.product_id, Some(&line_id)).checked_add(quantity);
            ensure_in_stock(&line.name, stock, wanted)?;
        }
        self.apply(cart.id, CartAction::SetQuantity { line_id, quantity }).await
    }

    #[instrument(skip(self))]
    pub async fn remove_line(&self, user_id: String, line_id: String) -> Result<Cart, CartError> {
        let cart = self.cart_for(user_id).await?;
        self.apply(cart.id, CartAction::RemoveLine(line_id)).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: String) -> Result<Cart, CartError> {
        let cart = self.cart_for(user_id).await?;
        self.apply(cart.id, CartAction::Clear).await
    }

    async fn apply(&self, cart_id: String, action: CartAction) -> Result<Cart, CartError> {
        match self.inner.perform_action(cart_id, action).await {
            Ok(result) => Ok(result.into_cart()),
            Err(FrameworkError::Rejected(reason)) if reason == "Cart item not found" => Err(CartError::LineNotFound(reason)),
            Err(e) => Err(e.into()),
        }
    }
}

/// `wanted` is `None` when the requested total does not fit in a `u32`.
fn ensure_in_stock(name: &str, stock: u32, wanted: Option<u32>) -> Result<(), CartError> {
    match wanted {
        None => Err(CartError::ValidationError("Quantity is too large".to_string())),
        Some(wanted) if wanted > stock => Err(ProductError::InsufficientStock(format!(
            "Insufficient stock for {}: {} available, {} requested",
            name, stock, wanted
        ))
        .into()),
        Some(_) => Ok(()),
    }
}
