use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format_rupees;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// A single use of a promo code, tied to the order that consumed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub user_id: String,
    pub order_number: String,
    pub discount: f64,
    pub redeemed_at: DateTime<Utc>,
}

/// A discount voucher with eligibility rules and a usage cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub id: String,
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub minimum_order_amount: f64,
    pub maximum_discount_amount: Option<f64>,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub usage_limit_per_user: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub applicable_categories: Vec<String>,
    pub excluded_categories: Vec<String>,
    #[serde(skip_serializing)]
    pub redemptions: Vec<Redemption>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeCreate {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub minimum_order_amount: f64,
    pub maximum_discount_amount: Option<f64>,
    pub usage_limit: Option<u32>,
    pub usage_limit_per_user: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub excluded_categories: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Partial update. `Some(None)` on the nullable limits clears them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodePatch {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub minimum_order_amount: Option<f64>,
    #[serde(default, with = "double_option")]
    pub maximum_discount_amount: Option<Option<f64>>,
    #[serde(default, with = "double_option")]
    pub usage_limit: Option<Option<u32>>,
    #[serde(default, with = "double_option")]
    pub usage_limit_per_user: Option<Option<u32>>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub applicable_categories: Option<Vec<String>>,
    pub excluded_categories: Option<Vec<String>>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// One cart or order line as seen by the applicability rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoLine {
    pub category: String,
    pub amount: f64,
}

/// What a promo code is checked against.
#[derive(Debug, Clone)]
pub struct ApplicabilityRequest {
    pub total_amount: f64,
    pub items: Vec<PromoLine>,
    pub user_id: String,
}

/// Outcome of validating a code against a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub code: String,
    pub discount: f64,
    pub final_amount: f64,
}

impl PromoCode {
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Active, inside its date window, and not used up.
    pub fn is_currently_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_until && !self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.map_or(false, |limit| self.used_count >= limit)
    }

    pub fn uses_by(&self, user_id: &str) -> u32 {
        self.redemptions.iter().filter(|r| r.user_id == user_id).count() as u32
    }

    /// Returns the first rule the request breaks, as a customer-facing reason.
    pub fn check_applicability(&self, request: &ApplicabilityRequest, now: DateTime<Utc>) -> Result<(), String> {
        if !self.is_active {
            return Err("Promo code is not active".to_string());
        }
        if now < self.valid_from {
            return Err("Promo code is not yet valid".to_string());
        }
        if now > self.valid_until {
            return Err("Promo code has expired".to_string());
        }
        if self.is_exhausted() {
            return Err("Promo code usage limit reached".to_string());
        }
        if request.total_amount < self.minimum_order_amount {
            return Err(format!(
                "Minimum order amount of ₹{} required",
                format_rupees(self.minimum_order_amount)
            ));
        }
        if let Some(per_user) = self.usage_limit_per_user {
            if self.uses_by(&request.user_id) >= per_user {
                return Err("You have already used this promo code".to_string());
            }
        }
        // Without line items there is nothing to check categories against.
        if !request.items.is_empty() && !request.items.iter().any(|line| self.covers_category(&line.category)) {
            return Err("Promo code is not applicable to items in your cart".to_string());
        }
        Ok(())
    }

    fn covers_category(&self, category: &str) -> bool {
        let matches = |list: &[String]| list.iter().any(|c| c.eq_ignore_ascii_case(category));
        (self.applicable_categories.is_empty() || matches(&self.applicable_categories))
            && !matches(&self.excluded_categories)
    }

    /// Discount for an order amount: rounded, capped by the maximum discount
    /// and never more than the amount itself.
    pub fn calculate_discount(&self, order_amount: f64) -> f64 {
        if order_amount <= 0.0 {
            return 0.0;
        }
        let raw = match self.discount_type {
            DiscountType::Percentage => (order_amount * self.discount_value / 100.0).round(),
            DiscountType::Fixed => self.discount_value,
        };
        let capped = match self.maximum_discount_amount {
            Some(max) => raw.min(max),
            None => raw,
        };
        capped.min(order_amount).max(0.0)
    }

    pub fn validate(&self, request: &ApplicabilityRequest, now: DateTime<Utc>) -> PromoValidation {
        match self.check_applicability(request, now) {
            Ok(()) => {
                let discount = self.calculate_discount(request.total_amount);
                PromoValidation {
                    valid: true,
                    reason: None,
                    code: self.code.clone(),
                    discount,
                    final_amount: request.total_amount - discount,
                }
            }
            Err(reason) => PromoValidation {
                valid: false,
                reason: Some(reason),
                code: self.code.clone(),
                discount: 0.0,
                final_amount: request.total_amount,
            },
        }
    }

    /// Invariants every stored code must satisfy.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.code.is_empty() {
            return Err("Promo code is required".to_string());
        }
        if !(self.discount_value > 0.0) {
            return Err("Discount value must be greater than zero".to_string());
        }
        if self.discount_type == DiscountType::Percentage && self.discount_value > 100.0 {
            return Err("Percentage discount cannot exceed 100".to_string());
        }
        if self.minimum_order_amount < 0.0 {
            return Err("Minimum order amount cannot be negative".to_string());
        }
        if matches!(self.maximum_discount_amount, Some(max) if max <= 0.0) {
            return Err("Maximum discount amount must be greater than zero".to_string());
        }
        if self.valid_from >= self.valid_until {
            return Err("Valid from date must be before valid until date".to_string());
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count > limit {
                return Err(format!("Usage limit {} is below current usage {}", limit, self.used_count));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn promo(code: &str, discount_type: DiscountType, value: f64) -> PromoCode {
        let now = Utc::now();
        PromoCode {
            id: "promo_1".into(),
            code: code.into(),
            description: String::new(),
            discount_type,
            discount_value: value,
            minimum_order_amount: 0.0,
            maximum_discount_amount: None,
            usage_limit: None,
            used_count: 0,
            usage_limit_per_user: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            is_active: true,
            applicable_categories: vec![],
            excluded_categories: vec![],
            redemptions: vec![],
            created_at: now,
        }
    }

    fn cart(total: f64) -> ApplicabilityRequest {
        ApplicabilityRequest {
            total_amount: total,
            items: vec![PromoLine { category: "Bouquets".into(), amount: total }],
            user_id: "user_1".into(),
        }
    }

    #[test]
    fn fixed_code_respects_minimum_order() {
        let mut save50 = promo("SAVE50", DiscountType::Fixed, 50.0);
        save50.minimum_order_amount = 200.0;

        let ok = save50.validate(&cart(300.0), Utc::now());
        assert!(ok.valid);
        assert_eq!(ok.discount, 50.0);
        assert_eq!(ok.final_amount, 250.0);

        let rejected = save50.validate(&cart(150.0), Utc::now());
        assert!(!rejected.valid);
        assert_eq!(rejected.reason.as_deref(), Some("Minimum order amount of ₹200 required"));
        assert_eq!(rejected.final_amount, 150.0);
    }

    #[test]
    fn percentage_code_is_capped() {
        let mut welcome = promo("WELCOME10", DiscountType::Percentage, 10.0);
        welcome.maximum_discount_amount = Some(200.0);
        assert_eq!(welcome.calculate_discount(3000.0), 200.0);
        assert_eq!(welcome.calculate_discount(1000.0), 100.0);
    }

    #[test]
    fn percentage_discount_rounds_and_never_exceeds_amount() {
        let pct = promo("P", DiscountType::Percentage, 15.0);
        for amount in [1.0, 3.0, 99.0, 333.0, 1234.5, 10_000.0] {
            let expected = (amount * 15.0 / 100.0_f64).round().min(amount);
            assert_eq!(pct.calculate_discount(amount), expected, "amount {amount}");
        }
        let full = promo("ALL", DiscountType::Percentage, 100.0);
        assert_eq!(full.calculate_discount(499.0), 499.0);
    }

    #[test]
    fn fixed_discount_never_exceeds_amount() {
        let flat = promo("FLAT", DiscountType::Fixed, 500.0);
        assert_eq!(flat.calculate_discount(300.0), 300.0);
        assert_eq!(flat.calculate_discount(800.0), 500.0);
        assert_eq!(flat.calculate_discount(0.0), 0.0);
    }

    #[test]
    fn expired_code_is_never_currently_valid() {
        let mut code = promo("OLD", DiscountType::Fixed, 10.0);
        let now = Utc::now();
        code.valid_from = now - Duration::days(10);
        code.valid_until = now - Duration::seconds(1);
        assert!(!code.is_currently_valid(now));
        assert_eq!(
            code.check_applicability(&cart(500.0), now),
            Err("Promo code has expired".to_string())
        );
    }

    #[test]
    fn future_and_inactive_codes_are_rejected() {
        let now = Utc::now();
        let mut future = promo("SOON", DiscountType::Fixed, 10.0);
        future.valid_from = now + Duration::days(1);
        future.valid_until = now + Duration::days(2);
        assert_eq!(
            future.check_applicability(&cart(500.0), now),
            Err("Promo code is not yet valid".to_string())
        );

        let mut off = promo("OFF", DiscountType::Fixed, 10.0);
        off.is_active = false;
        assert!(!off.is_currently_valid(now));
        assert_eq!(off.check_applicability(&cart(500.0), now), Err("Promo code is not active".to_string()));
    }

    #[test]
    fn exhausted_code_is_never_applicable() {
        let mut code = promo("LIMITED", DiscountType::Fixed, 10.0);
        code.usage_limit = Some(3);
        code.used_count = 3;
        assert!(!code.is_currently_valid(Utc::now()));
        assert_eq!(
            code.check_applicability(&cart(500.0), Utc::now()),
            Err("Promo code usage limit reached".to_string())
        );
    }

    #[test]
    fn per_user_limit_counts_redemptions() {
        let mut code = promo("ONCE", DiscountType::Fixed, 10.0);
        code.usage_limit_per_user = Some(1);
        assert!(code.check_applicability(&cart(500.0), Utc::now()).is_ok());

        code.redemptions.push(Redemption {
            user_id: "user_1".into(),
            order_number: "order_1".into(),
            discount: 10.0,
            redeemed_at: Utc::now(),
        });
        assert_eq!(
            code.check_applicability(&cart(500.0), Utc::now()),
            Err("You have already used this promo code".to_string())
        );
    }

    #[test]
    fn category_allow_and_deny_lists() {
        let mut code = promo("ROSES", DiscountType::Fixed, 10.0);
        code.applicable_categories = vec!["roses".into()];
        assert!(code.check_applicability(&cart(500.0), Utc::now()).is_err());

        let mut request = cart(500.0);
        request.items.push(PromoLine { category: "Roses".into(), amount: 100.0 });
        assert!(code.check_applicability(&request, Utc::now()).is_ok());

        code.applicable_categories.clear();
        code.excluded_categories = vec!["bouquets".into()];
        assert_eq!(
            code.check_applicability(&cart(500.0), Utc::now()),
            Err("Promo code is not applicable to items in your cart".to_string())
        );
    }

    #[test]
    fn invariants_reject_bad_windows_and_values() {
        let mut code = promo("BAD", DiscountType::Percentage, 120.0);
        assert!(code.check_invariants().is_err());

        code.discount_value = 10.0;
        code.valid_until = code.valid_from;
        assert_eq!(
            code.check_invariants(),
            Err("Valid from date must be before valid until date".to_string())
        );

        code.valid_until = code.valid_from + Duration::days(1);
        code.usage_limit = Some(1);
        code.used_count = 2;
        assert!(code.check_invariants().is_err());
    }
}
