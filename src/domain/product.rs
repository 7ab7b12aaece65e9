use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rating_average;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub name: String,
    pub price: f64,
}

/// What a shopper may personalise on a product or combo item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationOptions {
    pub allow_photo_upload: bool,
    pub allow_message_card: bool,
    pub message_card_price: f64,
    pub flower_addons: Vec<Addon>,
    pub chocolate_addons: Vec<Addon>,
}

impl CustomizationOptions {
    fn addon(&self, name: &str) -> Option<&Addon> {
        self.flower_addons
            .iter()
            .chain(self.chocolate_addons.iter())
            .find(|addon| addon.name.eq_ignore_ascii_case(name))
    }

    /// Extra cost of a selection, or the reason it is not allowed.
    fn surcharge(&self, selection: &Selection<'_>, label: &str) -> Result<f64, String> {
        let mut extra = 0.0;
        if selection.photo_url.is_some() && !self.allow_photo_upload {
            return Err(format!("{} does not allow photo upload", label));
        }
        if let Some(message) = selection.message_card {
            if !self.allow_message_card {
                return Err(format!("{} does not allow a message card", label));
            }
            if !message.trim().is_empty() {
                extra += self.message_card_price;
            }
        }
        for name in selection.addons {
            let addon = self
                .addon(name)
                .ok_or_else(|| format!("Unknown addon '{}' for {}", name, label))?;
            extra += addon.price;
        }
        Ok(extra)
    }
}

/// A sub-product bundled within a combo product, individually customizable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    pub image: Option<String>,
    #[serde(default)]
    pub customization_options: CustomizationOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComboCustomization {
    pub combo_item_index: usize,
    pub photo_url: Option<String>,
    pub message_card: Option<String>,
    pub addons: Vec<String>,
}

/// The shopper's choices for one cart or order line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemCustomization {
    pub photo_url: Option<String>,
    pub message_card: Option<String>,
    pub addons: Vec<String>,
    pub combo_items: Vec<ComboCustomization>,
}

struct Selection<'a> {
    photo_url: Option<&'a str>,
    message_card: Option<&'a str>,
    addons: &'a [String],
}

/// Represents a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub category: String,
    pub images: Vec<String>,
    pub stock: u32,
    pub is_active: bool,
    pub vendor_id: Option<String>,
    pub is_combo: bool,
    pub combo_items: Vec<ComboItem>,
    pub customization_options: CustomizationOptions,
    pub rating_average: f64,
    pub review_count: u32,
    /// Sum of all review ratings; the average is derived from it.
    #[serde(skip)]
    pub rating_total: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub combo_items: Vec<ComboItem>,
    #[serde(default)]
    pub customization_options: CustomizationOptions,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub is_active: Option<bool>,
    pub vendor_id: Option<String>,
    pub combo_items: Option<Vec<ComboItem>>,
    pub customization_options: Option<CustomizationOptions>,
}

impl Product {
    /// Extra cost the customization adds to one unit of this product.
    pub fn customization_surcharge(&self, custom: &ItemCustomization) -> Result<f64, String> {
        let own = Selection {
            photo_url: custom.photo_url.as_deref(),
            message_card: custom.message_card.as_deref(),
            addons: &custom.addons,
        };
        let mut extra = self.customization_options.surcharge(&own, &self.name)?;

        for combo in &custom.combo_items {
            let item = self
                .combo_items
                .get(combo.combo_item_index)
                .ok_or_else(|| format!("{} has no combo item {}", self.name, combo.combo_item_index))?;
            let selection = Selection {
                photo_url: combo.photo_url.as_deref(),
                message_card: combo.message_card.as_deref(),
                addons: &combo.addons,
            };
            extra += item.customization_options.surcharge(&selection, &item.name)?;
        }
        Ok(extra)
    }

    /// Price of one unit including customization extras.
    pub fn unit_price(&self, custom: &ItemCustomization) -> Result<f64, String> {
        Ok(self.price + self.customization_surcharge(custom)?)
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Product category is required".to_string());
        }
        if !(self.price > 0.0) {
            return Err("Product price must be greater than zero".to_string());
        }
        if matches!(self.original_price, Some(original) if original < self.price) {
            return Err("Original price cannot be below the selling price".to_string());
        }
        Ok(())
    }

    pub fn add_rating(&mut self, rating: u8) {
        self.rating_total = self.rating_total.saturating_add(rating as u32);
        self.review_count = self.review_count.saturating_add(1);
        self.rating_average = rating_average(self.rating_total, self.review_count);
    }

    pub fn remove_rating(&mut self, rating: u8) {
        self.rating_total = self.rating_total.saturating_sub(rating as u32);
        self.review_count = self.review_count.saturating_sub(1);
        self.rating_average = rating_average(self.rating_total, self.review_count);
    }

    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.description.to_lowercase().contains(&needle)
    }
}
