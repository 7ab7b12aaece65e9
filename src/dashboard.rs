//! Admin dashboard and sales analytics, computed from store snapshots.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Order, OrderStatus, Product, PromoCode, User};

pub const DEFAULT_REPORT_DAYS: u32 = 30;
pub const MAX_REPORT_DAYS: u32 = 365;
const RECENT_ORDERS: usize = 5;
const TOP_PRODUCTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            order_number: order.order_number.clone(),
            user_id: order.user_id.clone(),
            total: order.total,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: String,
    pub name: String,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub total_revenue: f64,
    pub orders_by_status: BTreeMap<&'static str, usize>,
    pub pending_orders: usize,
    pub total_products: usize,
    pub low_stock_products: Vec<LowStockProduct>,
    pub total_customers: usize,
    pub active_promo_codes: usize,
    pub average_order_value: f64,
    pub recent_orders: Vec<OrderSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub units_sold: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub days: u32,
    pub daily: Vec<DailySales>,
    pub top_products: Vec<ProductSales>,
    pub revenue_by_category: Vec<CategoryRevenue>,
}

fn counts_as_sale(order: &Order) -> bool {
    order.status != OrderStatus::Cancelled
}

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn summarize(
    orders: &[Order],
    products: &[Product],
    users: &[User],
    promos: &[PromoCode],
    low_stock_threshold: u32,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let sales: Vec<&Order> = orders.iter().filter(|o| counts_as_sale(o)).collect();
    let total_revenue = round2(sales.iter().map(|o| o.total).sum());

    let mut orders_by_status: BTreeMap<&'static str, usize> =
        OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for order in orders {
        *orders_by_status.entry(order.status.as_str()).or_default() += 1;
    }

    let mut low_stock_products: Vec<LowStockProduct> = products
        .iter()
        .filter(|p| p.is_active && p.stock <= low_stock_threshold)
        .map(|p| LowStockProduct {
            id: p.id.clone(),
            name: p.name.clone(),
            stock: p.stock,
        })
        .collect();
    low_stock_products.sort_by_key(|p| p.stock);

    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    DashboardSummary {
        total_orders: orders.len(),
        total_revenue,
        orders_by_status,
        pending_orders: orders.iter().filter(|o| !o.status.is_terminal()).count(),
        total_products: products.len(),
        low_stock_products,
        total_customers: users.iter().filter(|u| !u.is_admin()).count(),
        active_promo_codes: promos.iter().filter(|p| p.is_currently_valid(now)).count(),
        average_order_value: if sales.is_empty() {
            0.0
        } else {
            round2(total_revenue / sales.len() as f64)
        },
        recent_orders: recent.into_iter().take(RECENT_ORDERS).map(OrderSummary::from).collect(),
    }
}

/// Clamps a requested report length into `1..=365`, defaulting to 30.
pub fn report_days(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_REPORT_DAYS).clamp(1, MAX_REPORT_DAYS)
}

/// Sales over the last `days` days, including today. Days without orders
/// are present with zeros.
pub fn sales_report(orders: &[Order], days: u32, now: DateTime<Utc>) -> SalesReport {
    let today = now.date_naive();
    let first_day = today - Duration::days(i64::from(days) - 1);

    let mut daily: BTreeMap<NaiveDate, (usize, f64)> = first_day
        .iter_days()
        .take(days as usize)
        .map(|d| (d, (0, 0.0)))
        .collect();
    let mut by_product: HashMap<String, ProductSales> = HashMap::new();
    let mut by_category: HashMap<String, f64> = HashMap::new();

    let in_window = orders
        .iter()
        .filter(|o| counts_as_sale(o))
        .filter(|o| o.created_at.date_naive() >= first_day && o.created_at.date_naive() <= today);
    for order in in_window {
        if let Some(day) = daily.get_mut(&order.created_at.date_naive()) {
            day.0 += 1;
            day.1 += order.total;
        }
        for item in &order.items {
            let entry = by_product.entry(item.product_id.clone()).or_insert_with(|| ProductSales {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                units_sold: 0,
                revenue: 0.0,
            });
            entry.units_sold += item.quantity;
            entry.revenue += item.line_total();
            *by_category.entry(item.category.clone()).or_default() += item.line_total();
        }
    }

    let mut top_products: Vec<ProductSales> = by_product
        .into_values()
        .map(|mut p| {
            p.revenue = round2(p.revenue);
            p
        })
        .collect();
    top_products.sort_by(|a, b| b.units_sold.cmp(&a.units_sold).then_with(|| a.name.cmp(&b.name)));
    top_products.truncate(TOP_PRODUCTS);

    let mut revenue_by_category: Vec<CategoryRevenue> = by_category
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category,
            revenue: round2(revenue),
        })
        .collect();
    revenue_by_category.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.category.cmp(&b.category)));

    SalesReport {
        days,
        daily: daily
            .into_iter()
            .map(|(date, (orders, revenue))| DailySales {
                date,
                orders,
                revenue: round2(revenue),
            })
            .collect(),
        top_products,
        revenue_by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::tests::order;
    use crate::domain::product::tests::product;
    use crate::domain::OrderItem;

    fn sold(id: &str, status: OrderStatus, days_ago: i64, product: &str, category: &str, quantity: u32) -> Order {
        let mut o = order(status);
        o.id = id.into();
        o.created_at = Utc::now() - Duration::days(days_ago);
        o.items = vec![OrderItem {
            product_id: product.into(),
            name: product.to_uppercase(),
            category: category.into(),
            quantity,
            unit_price: 100.0,
            customization: Default::default(),
        }];
        o.total = 100.0 * quantity as f64;
        o
    }

    #[test]
    fn summary_excludes_cancelled_revenue() {
        let orders = vec![
            sold("order_1", OrderStatus::Delivered, 0, "p1", "Bouquets", 3),
            sold("order_2", OrderStatus::Cancelled, 0, "p1", "Bouquets", 5),
            sold("order_3", OrderStatus::Received, 1, "p2", "Cakes", 1),
        ];
        let mut low = product("product_2", 299.0, 2);
        low.name = "Tulips".into();
        let products = vec![product("product_1", 499.0, 40), low];

        let summary = summarize(&orders, &products, &[], &[], 5, Utc::now());
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue, 400.0);
        assert_eq!(summary.average_order_value, 200.0);
        assert_eq!(summary.pending_orders, 1);
        assert_eq!(summary.orders_by_status["cancelled"], 1);
        assert_eq!(summary.orders_by_status["being_made"], 0);
        assert_eq!(summary.low_stock_products.len(), 1);
        assert_eq!(summary.low_stock_products[0].name, "Tulips");
        assert_eq!(summary.recent_orders.len(), 3);
    }

    #[test]
    fn report_fills_empty_days_and_ranks_products() {
        let orders = vec![
            sold("order_1", OrderStatus::Delivered, 0, "p1", "Bouquets", 1),
            sold("order_2", OrderStatus::OrderPlaced, 2, "p2", "Cakes", 4),
            sold("order_3", OrderStatus::Cancelled, 2, "p1", "Bouquets", 9),
            sold("order_4", OrderStatus::Delivered, 40, "p1", "Bouquets", 9),
        ];
        let report = sales_report(&orders, 7, Utc::now());

        assert_eq!(report.daily.len(), 7);
        assert_eq!(report.daily.iter().map(|d| d.orders).sum::<usize>(), 2);
        assert_eq!(report.daily.iter().filter(|d| d.orders == 0).count(), 5);
        assert_eq!(report.top_products[0].product_id, "p2");
        assert_eq!(report.top_products[0].units_sold, 4);
        assert_eq!(report.revenue_by_category[0].category, "Cakes");
        assert_eq!(report.revenue_by_category[0].revenue, 400.0);
    }

    #[test]
    fn report_days_are_clamped() {
        assert_eq!(report_days(None), 30);
        assert_eq!(report_days(Some(0)), 1);
        assert_eq!(report_days(Some(1000)), 365);
    }
}
