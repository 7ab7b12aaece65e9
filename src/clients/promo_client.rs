use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{ApplicabilityRequest, PromoCode, PromoCodeCreate, PromoCodePatch, PromoValidation};
use crate::promo_actor::{PromoAction, PromoActionResult, PromoCodeError};

/// Client for interacting with the PromoCode actor.
#[derive(Clone)]
pub struct PromoClient {
    inner: ResourceClient<PromoCode>,
}

impl_basic_client!(PromoClient, PromoCode, PromoCodeError, promo_code);

impl PromoClient {
    #[instrument(skip(self, params), fields(code = %params.code))]
    pub async fn create_promo_code(&self, params: PromoCodeCreate) -> Result<PromoCode, PromoCodeError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(PromoCodeError::from)?;
        self.get_promo_code(id.clone()).await?.ok_or(PromoCodeError::NotFound(id))
    }

    #[instrument(skip(self, patch))]
    pub async fn update_promo_code(&self, id: String, patch: PromoCodePatch) -> Result<PromoCode, PromoCodeError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(PromoCodeError::from)
    }

    /// Looks a code up regardless of case and surrounding whitespace.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: String) -> Result<Option<PromoCode>, PromoCodeError> {
        let code = PromoCode::normalize_code(&code);
        let mut found = self
            .inner
            .find(move |promo: &PromoCode| promo.code == code)
            .await
            .map_err(PromoCodeError::from)?;
        Ok(found.pop())
    }

    async fn require_code(&self, code: String) -> Result<PromoCode, PromoCodeError> {
        self.find_by_code(code.clone())
            .await?
            .ok_or(PromoCodeError::UnknownCode(code))
    }

    /// Checks a code against a cart without consuming a use.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, total = request.total_amount))]
    pub async fn validate(
        &self,
        code: String,
        request: ApplicabilityRequest,
        now: DateTime<Utc>,
    ) -> Result<PromoValidation, PromoCodeError> {
        let promo = self.require_code(code).await?;
        match self.inner.perform_action(promo.id, PromoAction::Validate { request, now }).await {
            Ok(PromoActionResult::Validate(validation)) => Ok(validation),
            Ok(_) => Err(PromoCodeError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Consumes one use of the code for `order_number` and returns the discount.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, total = request.total_amount))]
    pub async fn redeem(
        &self,
        code: String,
        request: ApplicabilityRequest,
        order_number: String,
        now: DateTime<Utc>,
    ) -> Result<(PromoCode, f64), PromoCodeError> {
        let promo = self.require_code(code).await?;
        let action = PromoAction::Redeem { request, order_number, now };
        match self.inner.perform_action(promo.id.clone(), action).await {
            Ok(PromoActionResult::Redeem(discount)) => {
                info!(code = %promo.code, discount, "Promo code redeemed");
                Ok((promo, discount))
            }
            Ok(_) => Err(PromoCodeError::ActorCommunicationError("Unexpected result".to_string())),
            Err(FrameworkError::Rejected(reason)) => {
                debug!(code = %promo.code, %reason, "Promo code rejected");
                Err(PromoCodeError::NotApplicable(reason))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Gives back the use `order_number` consumed. Returns whether one was found.
    #[instrument(skip(self))]
    pub async fn release(&self, code: String, order_number: String) -> Result<bool, PromoCodeError> {
        let Some(promo) = self.find_by_code(code).await? else {
            warn!("Promo code vanished before release");
            return Ok(false);
        };
        match self.inner.perform_action(promo.id, PromoAction::Release { order_number }).await {
            Ok(PromoActionResult::Release(released)) => Ok(released),
            Ok(_) => Err(PromoCodeError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Codes a customer could use right now, soonest expiry first.
    #[instrument(skip(self))]
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<PromoCode>, PromoCodeError> {
        let mut codes = self
            .inner
            .find(move |promo: &PromoCode| promo.is_currently_valid(now))
            .await
            .map_err(PromoCodeError::from)?;
        codes.sort_by(|a, b| a.valid_until.cmp(&b.valid_until));
        Ok(codes)
    }
}
