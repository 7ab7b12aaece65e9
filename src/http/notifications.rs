use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AdminUser, ApiQuery, ApiResult, AppState};

/// Longest window a caller may ask for: one year.
const MAX_WINDOW_HOURS: i64 = 24 * 365;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recent))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/:id/read", put(mark_read))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Window {
    hours: Option<i64>,
}

async fn recent(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(window): ApiQuery<Window>,
) -> ApiResult<Json<Value>> {
    let window = window
        .hours
        .filter(|h| *h > 0)
        .map(|h| Duration::hours(h.min(MAX_WINDOW_HOURS)))
        .unwrap_or(state.notification_window);
    let notifications = state.notifications.recent(window, Utc::now()).await?;
    Ok(Json(json!({ "success": true, "notifications": notifications })))
}

async fn unread_count(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let count = state.notifications.unread_count().await?;
    Ok(Json(json!({ "success": true, "count": count })))
}

async fn mark_read(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let notification = state.notifications.mark_read(id).await?;
    Ok(Json(json!({ "success": true, "notification": notification })))
}

async fn mark_all_read(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let updated = state.notifications.mark_all_read().await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}
