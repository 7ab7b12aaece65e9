use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Review, ReviewCreate};

impl Entity for Review {
    const KIND: &'static str = "review";

    type Id = String;
    type CreateParams = ReviewCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: ReviewCreate) -> Result<Self, String> {
        if !(1..=5).contains(&params.rating) {
            return Err("Rating must be between 1 and 5".to_string());
        }
        Ok(Self {
            id,
            product_id: params.product_id,
            user_id: params.user_id,
            user_name: params.user_name,
            rating: params.rating,
            comment: params.comment.trim().to_string(),
            created_at: Utc::now(),
        })
    }

    /// One review per user per product.
    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.product_id, self.user_id))
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("Reviews cannot be edited".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
