use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ItemCustomization;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub line_id: String,
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub customization: ItemCustomization,
}

/// One cart per user, created on first use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CartCreate {
    pub user_id: String,
}

impl Cart {
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|line| line.unit_price * line.quantity as f64).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().fold(0, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Units of `product_id` across all lines, leaving out `except_line`.
    pub fn quantity_of(&self, product_id: &str, except_line: Option<&str>) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id && Some(line.line_id.as_str()) != except_line)
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }
}
