use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{AdminUser, ApiJson, ApiResult, AppState};
use crate::domain::{VendorCreate, VendorPatch};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route("/:id", get(get_vendor).put(update_vendor).delete(delete_vendor))
        .route("/:id/toggle", put(toggle_vendor))
}

async fn list_vendors(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let mut vendors = state.vendors.list_vendors().await?;
    vendors.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(json!({ "success": true, "vendors": vendors })))
}

async fn get_vendor(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let vendor = state
        .vendors
        .get_vendor(id.clone())
        .await?
        .ok_or(crate::vendor_actor::VendorError::NotFound(id))?;
    Ok(Json(json!({ "success": true, "vendor": vendor })))
}

async fn create_vendor(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(params): ApiJson<VendorCreate>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let vendor = state.vendors.create_vendor(params).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "vendor": vendor }))))
}

async fn update_vendor(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<VendorPatch>,
) -> ApiResult<Json<Value>> {
    let vendor = state.vendors.update_vendor(id, patch).await?;
    Ok(Json(json!({ "success": true, "vendor": vendor })))
}

async fn delete_vendor(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.vendors.delete_vendor(id).await?;
    Ok(Json(json!({ "success": true, "message": "Vendor removed" })))
}

async fn toggle_vendor(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let active = state.vendors.toggle_active(id).await?;
    Ok(Json(json!({ "success": true, "isActive": active })))
}
