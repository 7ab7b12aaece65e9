//! Cloneable handles over the store actors and services.
//!
//! Store-backed clients wrap a [`ResourceClient`](crate::actor_framework::ResourceClient)
//! and convert framework errors into their entity's error type. The
//! notification client talks to a hand-written service through
//! `client_method!`.

#[macro_use]
mod macros;

mod cart_client;
mod notification_client;
mod order_client;
mod product_client;
mod promo_client;
mod review_client;
mod user_client;
mod vendor_client;

pub use cart_client::CartClient;
pub use notification_client::NotificationClient;
pub use order_client::{OrderClient, OrderLineRequest, PlaceOrder, PricingRules};
pub use product_client::{ProductClient, ProductQuery};
pub use promo_client::PromoClient;
pub use review_client::ReviewClient;
pub use user_client::UserClient;
pub use vendor_client::VendorClient;
