use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::actors::NotificationError;
use crate::cart_actor::CartError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::promo_actor::PromoCodeError;
use crate::review_actor::ReviewError;
use crate::user_actor::UserError;
use crate::vendor_actor::VendorError;

/// Error body for every failed request: `{"success": false, "message": ...}`.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(cause) => {
                error!(%cause, "Request failed");
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            UserError::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            UserError::ValidationError(_) => ApiError::BadRequest(e.to_string()),
            UserError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(_) => ApiError::NotFound("Product not found".to_string()),
            ProductError::Unavailable(_) | ProductError::ValidationError(_) | ProductError::InsufficientStock(_) => {
                ApiError::BadRequest(e.to_string())
            }
            ProductError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => ApiError::NotFound("Order not found".to_string()),
            OrderError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            OrderError::InvalidProduct(_)
            | OrderError::InvalidUser(_)
            | OrderError::InsufficientStock(_)
            | OrderError::InvalidPromoCode(_)
            | OrderError::ValidationError(_) => ApiError::BadRequest(e.to_string()),
            OrderError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PromoCodeError> for ApiError {
    fn from(e: PromoCodeError) -> Self {
        match e {
            PromoCodeError::UnknownCode(_) => ApiError::NotFound(e.to_string()),
            PromoCodeError::NotFound(_) => ApiError::NotFound("Promo code not found".to_string()),
            PromoCodeError::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
            PromoCodeError::NotApplicable(_) | PromoCodeError::ValidationError(_) => {
                ApiError::BadRequest(e.to_string())
            }
            PromoCodeError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::NotFound(_) => ApiError::NotFound("Review not found".to_string()),
            ReviewError::UnknownProduct(_) => ApiError::NotFound("Product not found".to_string()),
            ReviewError::AlreadyReviewed => ApiError::Conflict(e.to_string()),
            ReviewError::Forbidden => ApiError::Forbidden(e.to_string()),
            ReviewError::ValidationError(_) => ApiError::BadRequest(e.to_string()),
            ReviewError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<VendorError> for ApiError {
    fn from(e: VendorError) -> Self {
        match e {
            VendorError::NotFound(_) => ApiError::NotFound("Vendor not found".to_string()),
            VendorError::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
            VendorError::ValidationError(_) => ApiError::BadRequest(e.to_string()),
            VendorError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::NotFound(_) | CartError::LineNotFound(_) => ApiError::NotFound(e.to_string()),
            CartError::ValidationError(_) => ApiError::BadRequest(e.to_string()),
            CartError::Product(inner) => inner.into(),
            CartError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound(_) => ApiError::NotFound(e.to_string()),
            NotificationError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_errors_map_to_statuses() {
        assert_eq!(ApiError::from(UserError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(PromoCodeError::UnknownCode("NOPE".into())),
            ApiError::NotFound("Invalid promo code".into())
        );
        assert_eq!(ApiError::from(ReviewError::AlreadyReviewed).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(CartError::Product(ProductError::InsufficientStock("none left".into()))),
            ApiError::BadRequest("none left".into())
        );
        assert_eq!(
            ApiError::from(OrderError::ActorCommunicationError("closed".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
