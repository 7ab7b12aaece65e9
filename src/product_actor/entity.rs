use chrono::Utc;

use super::actions::{ProductAction, ProductActionResult};
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};

impl Entity for Product {
    const KIND: &'static str = "product";

    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// A product with combo items is a combo product.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, String> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            description: params.description,
            price: params.price,
            original_price: params.original_price,
            category: params.category.trim().to_string(),
            images: params.images,
            stock: params.stock,
            is_active: params.is_active,
            vendor_id: params.vendor_id,
            is_combo: !params.combo_items.is_empty(),
            combo_items: params.combo_items,
            customization_options: params.customization_options,
            rating_average: 0.0,
            review_count: 0,
            rating_total: 0,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_create(&mut self) -> Result<(), String> {
        self.check_invariants()
    }

    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(original_price) = patch.original_price {
            self.original_price = Some(original_price);
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(vendor_id) = patch.vendor_id {
            self.vendor_id = Some(vendor_id);
        }
        if let Some(combo_items) = patch.combo_items {
            self.is_combo = !combo_items.is_empty();
            self.combo_items = combo_items;
        }
        if let Some(options) = patch.customization_options {
            self.customization_options = options;
        }
        self.updated_at = Utc::now();
        self.check_invariants()
    }

    /// Handles product-specific actions.
    ///
    /// # Errors
    /// Returns an error if attempting to reserve more stock than available.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, String> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::ReserveStock(0) => Err("Quantity must be at least 1".to_string()),
            ProductAction::ReserveStock(amount) => {
                if self.stock < amount {
                    return Err(format!(
                        "Insufficient stock for {}: {} available, {} requested",
                        self.name, self.stock, amount
                    ));
                }
                self.stock -= amount;
                Ok(ProductActionResult::ReserveStock(self.stock))
            }
            ProductAction::ReleaseStock(amount) => {
                self.stock = self.stock.saturating_add(amount);
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
            ProductAction::AddRating(rating) => {
                self.add_rating(rating);
                Ok(ProductActionResult::AddRating(self.rating_average))
            }
            ProductAction::RemoveRating(rating) => {
                self.remove_rating(rating);
                Ok(ProductActionResult::RemoveRating(self.rating_average))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::product;

    #[test]
    fn reserve_and_release_stock() {
        let mut p = product("product_1", 499.0, 3);
        assert_eq!(p.handle_action(ProductAction::ReserveStock(2)), Ok(ProductActionResult::ReserveStock(1)));
        assert!(p.handle_action(ProductAction::ReserveStock(2)).is_err());
        assert!(p.handle_action(ProductAction::ReserveStock(0)).is_err());
        assert_eq!(p.handle_action(ProductAction::ReleaseStock(2)), Ok(ProductActionResult::ReleaseStock(3)));
    }

    #[test]
    fn rating_deltas_keep_summary() {
        let mut p = product("product_1", 499.0, 3);
        assert_eq!(p.handle_action(ProductAction::AddRating(5)), Ok(ProductActionResult::AddRating(5.0)));
        assert_eq!(p.handle_action(ProductAction::AddRating(4)), Ok(ProductActionResult::AddRating(4.5)));
        assert_eq!(p.handle_action(ProductAction::AddRating(4)), Ok(ProductActionResult::AddRating(4.3)));
        assert_eq!(p.review_count, 3);
        assert_eq!(p.handle_action(ProductAction::RemoveRating(5)), Ok(ProductActionResult::RemoveRating(4.0)));
        p.handle_action(ProductAction::RemoveRating(4)).unwrap();
        p.handle_action(ProductAction::RemoveRating(4)).unwrap();
        assert_eq!((p.rating_average, p.review_count, p.rating_total), (0.0, 0, 0));
    }

    #[test]
    fn update_revalidates() {
        let mut p = product("product_1", 499.0, 3);
        let patch = ProductPatch { price: Some(-1.0), ..Default::default() };
        assert!(p.on_update(patch).is_err());
    }
}
