//! REST API over the store clients.

mod auth;
mod cart;
mod dashboard;
mod error;
mod notifications;
mod orders;
mod products;
mod promo_codes;
mod users;
mod vendors;


use axum::extract::{MatchedPath, Request};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Duration;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{field, info_span, warn, Instrument};
use uuid::Uuid;

pub use auth::{AdminUser, AuthUser, Claims, MaybeUser, TokenKeys};
pub use error::{ApiError, ApiJson, ApiQuery, ApiResult};

use crate::app_system::{Config, StoreSystem};
use crate::clients::{
    CartClient, NotificationClient, OrderClient, ProductClient, PromoClient, ReviewClient, UserClient, VendorClient,
};

/// Everything a handler needs. Cheap to clone: only client handles.
#[derive(Clone)]
pub struct AppState {
    pub users: UserClient,
    pub products: ProductClient,
    pub promos: PromoClient,
    pub reviews: ReviewClient,
    pub vendors: VendorClient,
    pub carts: CartClient,
    pub orders: OrderClient,
    pub notifications: NotificationClient,
    pub tokens: TokenKeys,
    pub notification_window: Duration,
    pub low_stock_threshold: u32,
}

impl AppState {
    pub fn new(system: &StoreSystem, config: &Config) -> Self {
        Self {
            users: system.user_client.clone(),
            products: system.product_client.clone(),
            promos: system.promo_client.clone(),
            reviews: system.review_client.clone(),
            vendors: system.vendor_client.clone(),
            carts: system.cart_client.clone(),
            orders: system.order_client.clone(),
            notifications: system.notification_client.clone(),
            tokens: TokenKeys::new(&config.jwt_secret, config.jwt_ttl_hours),
            notification_window: config.notification_window(),
            low_stock_threshold: config.pricing.low_stock_threshold,
        }
    }
}

pub fn router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/users", users::routes())
        .nest("/api/products", products::routes())
        .nest("/api/reviews", products::review_routes())
        .nest("/api/cart", cart::routes())
        .nest("/api/orders", orders::routes())
        .nest("/api/promocodes", promo_codes::routes())
        .nest("/api/vendors", vendors::routes())
        .nest("/api/notifications", notifications::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn(request_span))
        .layer(TraceLayer::new_for_http())
        .layer(cors(cors_origin))
        .with_state(state)
}

fn cors(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!(origin, "Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
    }
}

/// Runs each request inside an `http.request` span.
async fn request_span(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let span = info_span!(
        "http.request",
        method = %request.method(),
        route = %route,
        request_id = %Uuid::new_v4(),
        user_id = field::Empty,
    );
    next.run(request).instrument(span).await
}

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}
