use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiJson, ApiResult, AppState, AuthUser};
use crate::domain::{Cart, ItemCustomization};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:line_id", put(set_quantity).delete(remove_line))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    product_id: String,
    #[serde(default = "one")]
    quantity: u32,
    #[serde(default)]
    customization: ItemCustomization,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct QuantityBody {
    quantity: u32,
}

fn cart_body(cart: Cart) -> Json<Value> {
    Json(json!({
        "success": true,
        "cart": {
            "id": cart.id,
            "lines": cart.lines,
            "subtotal": cart.subtotal(),
            "itemCount": cart.item_count(),
            "updatedAt": cart.updated_at,
        }
    }))
}

async fn get_cart(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<Value>> {
    Ok(cart_body(state.carts.cart_for(user.id).await?))
}

async fn add_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<AddItemBody>,
) -> ApiResult<Json<Value>> {
    let cart = state
        .carts
        .add_item(user.id, body.product_id, body.quantity, body.customization)
        .await?;
    Ok(cart_body(cart))
}

async fn set_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(line_id): Path<String>,
    ApiJson(body): ApiJson<QuantityBody>,
) -> ApiResult<Json<Value>> {
    Ok(cart_body(state.carts.set_quantity(user.id, line_id, body.quantity).await?))
}

async fn remove_line(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(line_id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(cart_body(state.carts.remove_line(user.id, line_id).await?))
}

async fn clear_cart(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<Value>> {
    Ok(cart_body(state.carts.clear(user.id).await?))
}
