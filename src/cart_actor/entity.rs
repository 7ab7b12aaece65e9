use chrono::Utc;

use super::actions::{CartAction, CartActionResult};
use crate::actor_framework::Entity;
use crate::domain::{Cart, CartCreate};

impl Entity for Cart {
    const KIND: &'static str = "cart";

    type Id = String;
    type CreateParams = CartCreate;
    type Patch = ();
    type Action = CartAction;
    type ActionResult = CartActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: CartCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            user_id: params.user_id,
            lines: Vec::new(),
            updated_at: Utc::now(),
        })
    }

    /// One cart per user.
    fn unique_key(&self) -> Option<String> {
        Some(self.user_id.clone())
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Ok(())
    }

    fn handle_action(&mut self, action: CartAction) -> Result<CartActionResult, String> {
        self.updated_at = Utc::now();
        match action {
            CartAction::AddLine(line) => {
                if line.quantity == 0 {
                    return Err("Quantity must be at least 1".to_string());
                }
                let existing = self
                    .lines
                    .iter_mut()
                    .find(|l| l.product_id == line.product_id && l.customization == line.customization);
                match existing {
                    Some(existing) => {
                        existing.quantity = existing
                            .quantity
                            .checked_add(line.quantity)
                            .ok_or_else(|| "Quantity is too large".to_string())?;
                    }
                    None => self.lines.push(line),
                }
                Ok(CartActionResult::AddLine(self.clone()))
            }
            CartAction::SetQuantity { line_id, quantity } => {
                let index = self.line_index(&line_id)?;
                if quantity == 0 {
                    self.lines.remove(index);
                } else {
                    self.lines[index].quantity = quantity;
                }
                Ok(CartActionResult::SetQuantity(self.clone()))
            }
            CartAction::RemoveLine(line_id) => {
                let index = self.line_index(&line_id)?;
                self.lines.remove(index);
                Ok(CartActionResult::RemoveLine(self.clone()))
            }
            CartAction::Clear => {
                self.lines.clear();
                Ok(CartActionResult::Clear(self.clone()))
            }
        }
    }
}

impl Cart {
    fn line_index(&self, line_id: &str) -> Result<usize, String> {
        self.lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| "Cart item not found".to_string())
    }
}
