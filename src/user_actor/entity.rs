use chrono::Utc;

use super::actions::{UserAction, UserActionResult};
use crate::actor_framework::Entity;
use crate::domain::{hash_password, User, UserCreate, UserPatch};

const MIN_PASSWORD_LEN: usize = 6;

impl Entity for User {
    const KIND: &'static str = "user";

    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = UserAction;
    type ActionResult = UserActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// The email is normalized and the password salted and hashed; the plain
    /// password never reaches the store.
    fn from_create_params(id: String, params: UserCreate) -> Result<Self, String> {
        let email = User::normalize_email(&params.email);
        if params.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if !email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        if params.password.len() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
        }
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            email,
            phone: params.phone,
            role: params.role,
            password_hash: hash_password(&params.password)?,
            wishlist: Vec::new(),
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    /// Updates the user's profile information.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err("Name is required".to_string());
            }
            self.name = name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        Ok(())
    }

    fn handle_action(&mut self, action: UserAction) -> Result<UserActionResult, String> {
        match action {
            UserAction::AddToWishlist(product_id) => {
                if !self.wishlist.contains(&product_id) {
                    self.wishlist.push(product_id);
                }
                Ok(UserActionResult::AddToWishlist(self.wishlist.clone()))
            }
            UserAction::RemoveFromWishlist(product_id) => {
                self.wishlist.retain(|id| *id != product_id);
                Ok(UserActionResult::RemoveFromWishlist(self.wishlist.clone()))
            }
            UserAction::ToggleWishlist(product_id) => {
                if let Some(index) = self.wishlist.iter().position(|id| *id == product_id) {
                    self.wishlist.remove(index);
                    Ok(UserActionResult::ToggleWishlist(false))
                } else {
                    self.wishlist.push(product_id);
                    Ok(UserActionResult::ToggleWishlist(true))
                }
            }
        }
    }
}
