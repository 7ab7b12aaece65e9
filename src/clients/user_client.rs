use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserPatch};
use crate::user_actor::{UserAction, UserActionResult, UserError};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self, params), fields(email = %params.email))]
    pub async fn register(&self, params: UserCreate) -> Result<User, UserError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(UserError::from)?;
        info!(user_id = %id, "User registered");
        self.require(id).await
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: String, password: String) -> Result<User, UserError> {
        let user = self.find_by_email(email).await?.ok_or(UserError::InvalidCredentials)?;
        // Argon2 verification is CPU-bound; it runs on the blocking pool.
        let (user, matches) = tokio::task::spawn_blocking(move || {
            let matches = user.verify_password(&password);
            (user, matches)
        })
        .await
        .map_err(|e| UserError::ActorCommunicationError(format!("Password check failed: {}", e)))?;
        if !matches {
            warn!(user_id = %user.id, "Password mismatch");
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: String) -> Result<Option<User>, UserError> {
        let email = User::normalize_email(&email);
        let mut found = self
            .inner
            .find(move |user: &User| user.email == email)
            .await
            .map_err(UserError::from)?;
        Ok(found.pop())
    }

    /// Like `get_user`, but a missing user is an error.
    pub async fn require(&self, id: String) -> Result<User, UserError> {
        self.get_user(id.clone()).await?.ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: String, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn add_to_wishlist(&self, id: String, product_id: String) -> Result<Vec<String>, UserError> {
        match self.inner.perform_action(id, UserAction::AddToWishlist(product_id)).await {
            Ok(UserActionResult::AddToWishlist(list)) => Ok(list),
            Ok(_) => Err(UserError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, id: String, product_id: String) -> Result<Vec<String>, UserError> {
        match self.inner.perform_action(id, UserAction::RemoveFromWishlist(product_id)).await {
            Ok(UserActionResult::RemoveFromWishlist(list)) => Ok(list),
            Ok(_) => Err(UserError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn toggle_wishlist(&self, id: String, product_id: String) -> Result<bool, UserError> {
        match self.inner.perform_action(id, UserAction::ToggleWishlist(product_id)).await {
            Ok(UserActionResult::ToggleWishlist(added)) => Ok(added),
            Ok(_) => Err(UserError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
