use chrono::Utc;

use super::actions::{PromoAction, PromoActionResult};
use crate::actor_framework::Entity;
use crate::domain::{PromoCode, PromoCodeCreate, PromoCodePatch, Redemption};

impl Entity for PromoCode {
    const KIND: &'static str = "promo code";

    type Id = String;
    type CreateParams = PromoCodeCreate;
    type Patch = PromoCodePatch;
    type Action = PromoAction;
    type ActionResult = PromoActionResult;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: PromoCodeCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            code: PromoCode::normalize_code(&params.code),
            description: params.description,
            discount_type: params.discount_type,
            discount_value: params.discount_value,
            minimum_order_amount: params.minimum_order_amount,
            maximum_discount_amount: params.maximum_discount_amount,
            usage_limit: params.usage_limit,
            used_count: 0,
            usage_limit_per_user: params.usage_limit_per_user,
            valid_from: params.valid_from,
            valid_until: params.valid_until,
            is_active: params.is_active,
            applicable_categories: params.applicable_categories,
            excluded_categories: params.excluded_categories,
            redemptions: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Codes are unique regardless of case.
    fn unique_key(&self) -> Option<String> {
        Some(self.code.clone())
    }

    fn on_create(&mut self) -> Result<(), String> {
        self.check_invariants()
    }

    fn on_update(&mut self, patch: PromoCodePatch) -> Result<(), String> {
        if let Some(code) = patch.code {
            self.code = PromoCode::normalize_code(&code);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(discount_type) = patch.discount_type {
            self.discount_type = discount_type;
        }
        if let Some(value) = patch.discount_value {
            self.discount_value = value;
        }
        if let Some(minimum) = patch.minimum_order_amount {
            self.minimum_order_amount = minimum;
        }
        if let Some(maximum) = patch.maximum_discount_amount {
            self.maximum_discount_amount = maximum;
        }
        if let Some(limit) = patch.usage_limit {
            self.usage_limit = limit;
        }
        if let Some(per_user) = patch.usage_limit_per_user {
            self.usage_limit_per_user = per_user;
        }
        if let Some(from) = patch.valid_from {
            self.valid_from = from;
        }
        if let Some(until) = patch.valid_until {
            self.valid_until = until;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(categories) = patch.applicable_categories {
            self.applicable_categories = categories;
        }
        if let Some(categories) = patch.excluded_categories {
            self.excluded_categories = categories;
        }
        self.check_invariants()
    }

    fn handle_action(&mut self, action: PromoAction) -> Result<PromoActionResult, String> {
        match action {
            PromoAction::Validate { request, now } => Ok(PromoActionResult::Validate(self.validate(&request, now))),
            PromoAction::Redeem { request, order_number, now } => {
                self.check_applicability(&request, now)?;
                let discount = self.calculate_discount(request.total_amount);
                self.used_count += 1;
                self.redemptions.push(Redemption {
                    user_id: request.user_id,
                    order_number,
                    discount,
                    redeemed_at: now,
                });
                Ok(PromoActionResult::Redeem(discount))
            }
            PromoAction::Release { order_number } => {
                let Some(index) = self.redemptions.iter().position(|r| r.order_number == order_number) else {
                    return Ok(PromoActionResult::Release(false));
                };
                self.redemptions.remove(index);
                self.used_count = self.used_count.saturating_sub(1);
                Ok(PromoActionResult::Release(true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::promo_code::tests::promo;
    use crate::domain::{ApplicabilityRequest, DiscountType, PromoLine};

    fn request(total: f64, user: &str) -> ApplicabilityRequest {
        ApplicabilityRequest {
            total_amount: total,
            items: vec![PromoLine { category: "Bouquets".into(), amount: total }],
            user_id: user.into(),
        }
    }

    #[test]
    fn redeem_consumes_until_limit_then_release_frees() {
        let mut code = promo("TWICE", DiscountType::Fixed, 100.0);
        code.usage_limit = Some(2);

        for order in ["order_1", "order_2"] {
            let result = code.handle_action(PromoAction::Redeem {
                request: request(500.0, "user_1"),
                order_number: order.into(),
                now: Utc::now(),
            });
            assert_eq!(result, Ok(PromoActionResult::Redeem(100.0)));
        }
        let third = code.handle_action(PromoAction::Redeem {
            request: request(500.0, "user_2"),
            order_number: "order_3".into(),
            now: Utc::now(),
        });
        assert_eq!(third, Err("Promo code usage limit reached".to_string()));
        assert_eq!(code.used_count, 2);

        let released = code.handle_action(PromoAction::Release { order_number: "order_1".into() });
        assert_eq!(released, Ok(PromoActionResult::Release(true)));
        assert_eq!(code.used_count, 1);

        let unknown = code.handle_action(PromoAction::Release { order_number: "order_9".into() });
        assert_eq!(unknown, Ok(PromoActionResult::Release(false)));
        assert_eq!(code.used_count, 1);
    }

    #[test]
    fn lowering_limit_below_usage_is_rejected() {
        let mut code = promo("BUSY", DiscountType::Fixed, 10.0);
        code.used_count = 5;
        let patch = PromoCodePatch { usage_limit: Some(Some(3)), ..Default::default() };
        assert!(code.on_update(patch).is_err());
    }

    #[test]
    fn codes_are_normalized() {
        let params: PromoCodeCreate = serde_json::from_value(serde_json::json!({
            "code": " welcome10 ",
            "discountType": "percentage",
            "discountValue": 10,
            "maximumDiscountAmount": 200,
            "validFrom": "2026-01-01T00:00:00Z",
            "validUntil": "2027-01-01T00:00:00Z"
        }))
        .unwrap();
        let code = PromoCode::from_create_params("promo_1".into(), params).unwrap();
        assert_eq!(code.code, "WELCOME10");
        assert_eq!(code.unique_key().as_deref(), Some("WELCOME10"));
        assert!(code.is_active);
    }
}
