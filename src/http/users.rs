use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{ApiError, ApiJson, ApiResult, AppState, AuthUser};
use crate::domain::{Role, User, UserCreate, UserPatch};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
        .route("/wishlist", get(wishlist).post(add_to_wishlist))
        .route("/wishlist/:product_id", delete(remove_from_wishlist))
        .route("/wishlist/:product_id/toggle", post(toggle_wishlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistBody {
    product_id: String,
}

fn session(state: &AppState, user: User) -> ApiResult<Json<Value>> {
    let token = state.tokens.issue(&user)?;
    Ok(Json(json!({ "success": true, "token": token, "user": user })))
}

async fn register(State(state): State<AppState>, ApiJson(body): ApiJson<RegisterBody>) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = state
        .users
        .register(UserCreate {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
            role: Role::Customer,
        })
        .await?;
    Ok((StatusCode::CREATED, session(&state, user)?))
}

async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginBody>) -> ApiResult<Json<Value>> {
    let user = state.users.authenticate(body.email, body.password).await?;
    info!(user_id = %user.id, "User logged in");
    session(&state, user)
}

async fn me(AuthUser(user): AuthUser) -> Json<Value> {
    Json(json!({ "success": true, "user": user }))
}

async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<Json<Value>> {
    let user = state.users.update_user(user.id, patch).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

async fn wishlist(AuthUser(user): AuthUser) -> Json<Value> {
    Json(json!({ "success": true, "wishlist": user.wishlist }))
}

async fn ensure_product(state: &AppState, product_id: &str) -> ApiResult<()> {
    state
        .products
        .get_product(product_id.to_string())
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}

async fn add_to_wishlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<WishlistBody>,
) -> ApiResult<Json<Value>> {
    ensure_product(&state, &body.product_id).await?;
    let wishlist = state.users.add_to_wishlist(user.id, body.product_id).await?;
    Ok(Json(json!({ "success": true, "wishlist": wishlist })))
}

async fn remove_from_wishlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let wishlist = state.users.remove_from_wishlist(user.id, product_id).await?;
    Ok(Json(json!({ "success": true, "wishlist": wishlist })))
}

async fn toggle_wishlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !user.wishlist.contains(&product_id) {
        ensure_product(&state, &product_id).await?;
    }
    let added = state.users.toggle_wishlist(user.id, product_id).await?;
    Ok(Json(json!({ "success": true, "added": added })))
}
