/// Custom actions for Product entities.
///
/// These actions represent domain-specific operations that can be performed
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Reserves a specified amount of stock for an order or cart.
    ///
    /// # Errors
    /// Will fail if the requested amount exceeds available stock.
    ReserveStock(u32),
    /// Returns previously reserved stock (cancelled or failed orders).
    ReleaseStock(u32),
    /// Folds a new review's rating into the summary.
    AddRating(u8),
    /// Takes a deleted review's rating back out.
    RemoveRating(u8),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    /// Current stock level
    CheckStock(u32),
    /// Stock left after the reservation
    ReserveStock(u32),
    /// Stock after the release
    ReleaseStock(u32),
    /// Average after the change
    AddRating(f64),
    RemoveRating(f64),
}
