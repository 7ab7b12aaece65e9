use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A florist or gift supplier fulfilling catalog products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub specialties: Vec<String>,
    pub is_active: bool,
    pub commission_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCreate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub commission_rate: Option<f64>,
}

impl Vendor {
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Vendor name is required".to_string());
        }
        if !self.email.contains('@') {
            return Err("Vendor email is invalid".to_string());
        }
        if !(0.0..=100.0).contains(&self.commission_rate) {
            return Err("Commission rate must be between 0 and 100".to_string());
        }
        Ok(())
    }
}
