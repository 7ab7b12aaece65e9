/// Wishlist operations on a user.
#[derive(Debug, Clone)]
pub enum UserAction {
    AddToWishlist(String),
    RemoveFromWishlist(String),
    /// Adds the product when absent, removes it when present.
    ToggleWishlist(String),
}

/// Results from UserActions - variants match 1:1 with UserAction
#[derive(Debug, Clone, PartialEq)]
pub enum UserActionResult {
    AddToWishlist(Vec<String>),
    RemoveFromWishlist(Vec<String>),
    /// `true` when the product is now on the wishlist
    ToggleWishlist(bool),
}
