use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AdminUser, ApiJson, ApiQuery, ApiResult, AppState, AuthUser, MaybeUser};
use crate::clients::ProductQuery;
use crate::domain::{ProductCreate, ProductPatch};

const DEFAULT_PAGE_SIZE: usize = 12;
const MAX_PAGE_SIZE: usize = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/:id/stock", get(check_stock))
        .route("/:id/reviews", get(list_reviews).post(add_review))
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_review))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pagination {
    page: Option<usize>,
    limit: Option<usize>,
}

impl Pagination {
    /// 1-based page and a page size in `1..=100`.
    fn resolve(&self) -> (usize, usize) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }

    /// Items to skip before the requested page.
    fn offset(&self) -> usize {
        let (page, limit) = self.resolve();
        (page - 1).saturating_mul(limit)
    }
}

async fn list_products(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(mut query): ApiQuery<ProductQuery>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Value>> {
    if !viewer.as_ref().is_some_and(|u| u.is_admin()) {
        query.include_inactive = false;
    }
    let (page, limit) = pagination.resolve();
    let products = state.products.search(query).await?;
    let total = products.len();
    let items: Vec<_> = products.into_iter().skip(pagination.offset()).take(limit).collect();
    Ok(Json(json!({
        "success": true,
        "products": items,
        "page": page,
        "pages": total.div_ceil(limit),
        "total": total,
    })))
}

async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let product = state.products.require(id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

async fn check_stock(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let stock = state.products.check_stock(id).await?;
    Ok(Json(json!({ "success": true, "stock": stock, "inStock": stock > 0 })))
}

async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(params): ApiJson<ProductCreate>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let product = state.products.create_product(params).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "product": product }))))
}

async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Value>> {
    let product = state.products.update_product(id, patch).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.products.delete_product(id).await?;
    Ok(Json(json!({ "success": true, "message": "Product removed" })))
}

#[derive(Debug, Deserialize)]
struct ReviewBody {
    rating: u8,
    #[serde(default)]
    comment: String,
}

async fn list_reviews(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let reviews = state.reviews.list_for_product(id).await?;
    Ok(Json(json!({ "success": true, "reviews": reviews })))
}

async fn add_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let review = state.reviews.add_review(id, &user, body.rating, body.comment).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "review": review }))))
}

async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.reviews.remove_review(id, &user).await?;
    Ok(Json(json!({ "success": true, "message": "Review removed" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::default().resolve(), (1, 12));
        assert_eq!(Pagination { page: Some(0), limit: Some(500) }.resolve(), (1, 100));
        assert_eq!(Pagination { page: Some(3), limit: Some(0) }.resolve(), (3, 1));
        assert_eq!(Pagination { page: Some(3), limit: Some(10) }.offset(), 20);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let far = Pagination { page: Some(usize::MAX), limit: Some(100) };
        assert_eq!(far.resolve(), (usize::MAX, 100));
        assert_eq!(far.offset(), usize::MAX);
    }
}
