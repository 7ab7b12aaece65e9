use tracing::{debug, info, instrument, warn};

use super::{NotificationClient, ProductClient};
use crate::actor_framework::ResourceClient;
use crate::domain::{NotificationDraft, NotificationKind, Review, ReviewCreate, User};
use crate::product_actor::ProductError;
use crate::review_actor::ReviewError;

/// Client for the Review actor. Keeps product ratings in step with reviews.
#[derive(Clone)]
pub struct ReviewClient {
    inner: ResourceClient<Review>,
    product_client: ProductClient,
    notifier: NotificationClient,
}

impl_client_methods!(ReviewClient, Review, ReviewError, review);

impl ReviewClient {
    pub fn new(inner: ResourceClient<Review>, product_client: ProductClient, notifier: NotificationClient) -> Self {
        Self {
            inner,
            product_client,
            notifier,
        }
    }

    /// Reviews of one product, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_product(&self, product_id: String) -> Result<Vec<Review>, ReviewError> {
        let mut reviews = self
            .inner
            .find(move |r: &Review| r.product_id == product_id)
            .await
            .map_err(ReviewError::from)?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    #[instrument(skip(self, author, comment), fields(user_id = %author.id))]
    pub async fn add_review(
        &self,
        product_id: String,
        author: &User,
        rating: u8,
        comment: String,
    ) -> Result<Review, ReviewError> {
        let product = self
            .product_client
            .get_product(product_id.clone())
            .await
            .map_err(|e| ReviewError::ActorCommunicationError(e.to_string()))?
            .ok_or_else(|| ReviewError::UnknownProduct(product_id.clone()))?;

        let params = ReviewCreate {
            product_id: product_id.clone(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            rating,
            comment,
        };
        let id = self.inner.create(params).await.map_err(ReviewError::from)?;
        let review = self
            .get_review(id.clone())
            .await?
            .ok_or(ReviewError::NotFound(id))?;
        info!(review_id = %review.id, rating, "Review added");

        self.refresh_rating(product_id, rating, false).await?;

        let draft = NotificationDraft::new(
            NotificationKind::NewReview,
            "New review",
            format!("{} rated {} {}/5", author.name, product.name, rating),
        );
        if let Err(e) = self.notifier.publish(draft).await {
            warn!(error = %e, "Failed to publish review notification");
        }
        Ok(review)
    }

    /// Deletes a review. Only its author or an admin may do so.
    #[instrument(skip(self, requester), fields(user_id = %requester.id))]
    pub async fn remove_review(&self, id: String, requester: &User) -> Result<Review, ReviewError> {
        let review = self
            .get_review(id.clone())
            .await?
            .ok_or_else(|| ReviewError::NotFound(id.clone()))?;
        if review.user_id != requester.id && !requester.is_admin() {
            return Err(ReviewError::Forbidden);
        }
        let removed = self.delete_review(id).await?;
        self.refresh_rating(removed.product_id.clone(), removed.rating, true).await?;
        Ok(removed)
    }

    /// Updates the product's rating summary inside the product store, so
    /// concurrent reviews of one product cannot overwrite each other.
    async fn refresh_rating(&self, product_id: String, rating: u8, removed: bool) -> Result<(), ReviewError> {
        match self.product_client.apply_rating(product_id.clone(), rating, removed).await {
            Ok(average) => {
                debug!(%product_id, average, "Rating refreshed");
                Ok(())
            }
            // The product may have been deleted since; its reviews stay orphaned.
            Err(ProductError::NotFound(_)) => Ok(()),
            Err(e) => Err(ReviewError::ActorCommunicationError(e.to_string())),
        }
    }
}
