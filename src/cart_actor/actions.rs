use crate::domain::{Cart, CartLine};

#[derive(Debug, Clone)]
pub enum CartAction {
    /// Adds a line, merging into an existing line with the same product and customization.
    AddLine(CartLine),
    /// Sets a line's quantity; zero removes the line.
    SetQuantity { line_id: String, quantity: u32 },
    RemoveLine(String),
    Clear,
}

/// Results from CartActions - each returns the cart afterwards
#[derive(Debug, Clone, PartialEq)]
pub enum CartActionResult {
    AddLine(Cart),
    SetQuantity(Cart),
    RemoveLine(Cart),
    Clear(Cart),
}

impl CartActionResult {
    pub fn into_cart(self) -> Cart {
        match self {
            CartActionResult::AddLine(cart)
            | CartActionResult::SetQuantity(cart)
            | CartActionResult::RemoveLine(cart)
            | CartActionResult::Clear(cart) => cart,
        }
    }
}
