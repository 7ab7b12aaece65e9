use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AdminUser, ApiJson, ApiQuery, ApiResult, AppState, AuthUser};
use crate::clients::PlaceOrder;
use crate::domain::{OrderStatus, PaymentStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/mine", get(my_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_status))
        .route("/:id/cancel", put(cancel_order))
        .route("/:id/payment", put(record_payment))
}

#[derive(Debug, Default, Deserialize)]
struct StatusFilter {
    status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: OrderStatus,
    note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CancelBody {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentBody {
    status: PaymentStatus,
    reference: Option<String>,
}

async fn place_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<PlaceOrder>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let order = state.orders.place_order(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "order": order }))))
}

async fn my_orders(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<Value>> {
    let orders = state.orders.list_mine(user.id).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

async fn get_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let order = state.orders.get_for(id, &user).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}

async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Json<Value>> {
    let orders = state.orders.list_all(filter.status).await?;
    Ok(Json(json!({ "success": true, "count": orders.len(), "orders": orders })))
}

async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ApiResult<Json<Value>> {
    let note = body.note.filter(|n| !n.trim().is_empty());
    let order = state.orders.update_status(id, body.status, note).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}

async fn cancel_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Option<ApiJson<CancelBody>>,
) -> ApiResult<Json<Value>> {
    let reason = body.and_then(|ApiJson(body)| body.reason);
    let order = state.orders.cancel(id, &user, reason).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}

async fn record_payment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PaymentBody>,
) -> ApiResult<Json<Value>> {
    let order = state.orders.record_payment(id, body.status, body.reference).await?;
    Ok(Json(json!({ "success": true, "order": order })))
}
