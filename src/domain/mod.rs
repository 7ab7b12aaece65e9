//! Storefront records. Plain data plus the pure rules that belong to them.

pub mod cart;
pub mod notification;
pub mod order;
pub mod product;
pub mod promo_code;
pub mod review;
pub mod user;
pub mod vendor;

pub use cart::*;
pub use notification::*;
pub use order::*;
pub use product::*;
pub use promo_code::*;
pub use review::*;
pub use user::*;
pub use vendor::*;

/// Rupee amount for messages: whole amounts without decimals.
pub fn format_rupees(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}
