#[derive(Debug, Clone)]
pub enum VendorAction {
    /// Flips `is_active`.
    ToggleActive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VendorActionResult {
    /// New value of `is_active`
    ToggleActive(bool),
}
