use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AdminUser, ApiQuery, ApiResult, AppState};
use crate::dashboard::{report_days, sales_report, summarize};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/analytics/sales", get(sales))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportQuery {
    days: Option<u32>,
}

async fn dashboard(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let orders = state.orders.list_orders().await?;
    let products = state.products.list_products().await?;
    let users = state.users.list_users().await?;
    let promos = state.promos.list_promo_codes().await?;

    let summary = summarize(&orders, &products, &users, &promos, state.low_stock_threshold, Utc::now());
    Ok(Json(json!({ "success": true, "dashboard": summary })))
}

async fn sales(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<Value>> {
    let orders = state.orders.list_orders().await?;
    let report = sales_report(&orders, report_days(query.days), Utc::now());
    Ok(Json(json!({ "success": true, "analytics": report })))
}
