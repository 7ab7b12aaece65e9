use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Catalog filters. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub vendor_id: Option<String>,
    pub combo_only: bool,
    pub include_inactive: bool,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        (self.include_inactive || product.is_active)
            && self
                .category
                .as_deref()
                .map_or(true, |c| product.category.eq_ignore_ascii_case(c))
            && self.search.as_deref().map_or(true, |s| product.matches_text(s))
            && self.min_price.map_or(true, |min| product.price >= min)
            && self.max_price.map_or(true, |max| product.price <= max)
            && self
                .vendor_id
                .as_deref()
                .map_or(true, |v| product.vendor_id.as_deref() == Some(v))
            && (!self.combo_only || product.is_combo)
    }
}

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(ProductError::from)?;
        self.require(id).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    /// Matching products, newest first.
    #[instrument(skip(self))]
    pub async fn search(&self, query: ProductQuery) -> Result<Vec<Product>, ProductError> {
        let mut products = self
            .inner
            .find(move |p: &Product| query.matches(p))
            .await
            .map_err(ProductError::from)?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    /// Like `get_product`, but a missing product is an error.
    pub async fn require(&self, id: String) -> Result<Product, ProductError> {
        self.get_product(id.clone()).await?.ok_or(ProductError::NotFound(id))
    }

    /// An existing, active product.
    pub async fn require_available(&self, id: String) -> Result<Product, ProductError> {
        let product = self.require(id).await?;
        if !product.is_active {
            return Err(ProductError::Unavailable(product.name));
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await {
            Ok(ProductActionResult::CheckStock(level)) => Ok(level),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Reserves stock and returns what is left.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::ReserveStock(quantity)).await {
            Ok(ProductActionResult::ReserveStock(left)) => Ok(left),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(crate::actor_framework::FrameworkError::Rejected(reason)) => Err(ProductError::InsufficientStock(reason)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn release_stock(&self, id: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::ReleaseStock(quantity)).await {
            Ok(ProductActionResult::ReleaseStock(level)) => Ok(level),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Releases every reservation in the list, logging failures instead of stopping.
    pub async fn release_all(&self, reservations: &[(String, u32)]) {
        for (id, quantity) in reservations {
            if let Err(e) = self.release_stock(id.clone(), *quantity).await {
                warn!(product_id = %id, error = %e, "Failed to release stock");
            }
        }
    }

    /// Adds (or with `removed`, takes back) one review rating. Returns the new average.
    #[instrument(skip(self))]
    pub async fn apply_rating(&self, id: String, rating: u8, removed: bool) -> Result<f64, ProductError> {
        let action = if removed {
            ProductAction::RemoveRating(rating)
        } else {
            ProductAction::AddRating(rating)
        };
        match self.inner.perform_action(id, action).await {
            Ok(ProductActionResult::AddRating(average) | ProductActionResult::RemoveRating(average)) => Ok(average),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::product;

    #[test]
    fn query_filters_combine() {
        let mut p = product("product_1", 499.0, 4);
        p.vendor_id = Some("vendor_1".into());

        assert!(ProductQuery::default().matches(&p));
        let query = ProductQuery {
            category: Some("bouquets".into()),
            search: Some("ROSE".into()),
            min_price: Some(400.0),
            max_price: Some(500.0),
            vendor_id: Some("vendor_1".into()),
            ..Default::default()
        };
        assert!(query.matches(&p));

        assert!(!ProductQuery { max_price: Some(100.0), ..Default::default() }.matches(&p));
        assert!(!ProductQuery { combo_only: true, ..Default::default() }.matches(&p));

        p.is_active = false;
        assert!(!ProductQuery::default().matches(&p));
        assert!(ProductQuery { include_inactive: true, ..Default::default() }.matches(&p));
    }
}
