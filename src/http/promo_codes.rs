use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AdminUser, ApiError, ApiJson, ApiResult, AppState, AuthUser};
use crate::domain::{ApplicabilityRequest, PromoCodeCreate, PromoCodePatch, PromoLine};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_codes).post(create_code))
        .route("/validate", post(validate_code))
        .route("/active", get(active_codes))
        .route("/:id", put(update_code).delete(delete_code))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateBody {
    code: String,
    total_amount: f64,
    #[serde(default)]
    items: Vec<PromoLine>,
}

async fn validate_code(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<ValidateBody>,
) -> ApiResult<Json<Value>> {
    if body.code.trim().is_empty() {
        return Err(ApiError::BadRequest("Promo code is required".to_string()));
    }
    let request = ApplicabilityRequest {
        total_amount: body.total_amount,
        items: body.items,
        user_id: user.id,
    };
    let validation = state.promos.validate(body.code, request, Utc::now()).await?;
    if !validation.valid {
        let reason = validation.reason.unwrap_or_else(|| "Invalid promo code".to_string());
        return Err(ApiError::BadRequest(reason));
    }
    Ok(Json(json!({
        "success": true,
        "valid": true,
        "code": validation.code,
        "discount": validation.discount,
        "finalAmount": validation.final_amount,
    })))
}

async fn active_codes(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let codes: Vec<Value> = state
        .promos
        .list_active(Utc::now())
        .await?
        .into_iter()
        .map(|p| {
            json!({
                "code": p.code,
                "description": p.description,
                "discountType": p.discount_type,
                "discountValue": p.discount_value,
                "minimumOrderAmount": p.minimum_order_amount,
                "maximumDiscountAmount": p.maximum_discount_amount,
                "validUntil": p.valid_until,
            })
        })
        .collect();
    Ok(Json(json!({ "success": true, "promoCodes": codes })))
}

async fn list_codes(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let mut codes = state.promos.list_promo_codes().await?;
    codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(json!({ "success": true, "promoCodes": codes })))
}

async fn create_code(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(params): ApiJson<PromoCodeCreate>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let code = state.promos.create_promo_code(params).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "promoCode": code }))))
}

async fn update_code(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<PromoCodePatch>,
) -> ApiResult<Json<Value>> {
    let code = state.promos.update_promo_code(id, patch).await?;
    Ok(Json(json!({ "success": true, "promoCode": code })))
}

async fn delete_code(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.promos.delete_promo_code(id).await?;
    Ok(Json(json!({ "success": true, "message": "Promo code removed" })))
}
