//! Dashboard KPIs computed from the full order, user and product lists.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::models::{Order, Page, Product, User};

/// Every list is fetched as one large page
const FETCH_PAGE_SIZE: u32 = 1000;

/// Number of entries in the top product, country and recent order lists
const TOP_N: usize = 6;

const MONTHS: [&str; 8] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon"
    pub label: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyEarnings {
    pub month: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySales {
    pub country: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_sales: f64,
    pub total_income: f64,
    pub orders_paid: usize,
    pub order_count: usize,
    pub user_count: usize,
    pub product_count: usize,
    /// Oldest day first, ending today
    pub last_7_days: Vec<DailySales>,
    pub monthly: Vec<MonthlyEarnings>,
    pub top_products: Vec<Product>,
    pub top_countries: Vec<CountrySales>,
    pub recent_orders: Vec<Order>,
}

/// Calendar date from the leading `YYYY-MM-DD` of a timestamp
fn order_date(created_at: Option<&str>) -> Option<NaiveDate> {
    let s = created_at?;
    let prefix = s.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

impl Dashboard {
    /// Fetch the three lists concurrently and aggregate them. The seven-day
    /// window ends on the current UTC date.
    pub async fn load(client: &ApiClient) -> Result<Self, ApiError> {
        let page = |path: &str| {
            ApiRequest::get(path)
                .query("page", 1)
                .query("page_size", FETCH_PAGE_SIZE)
        };

        let (orders, users, products) = futures::try_join!(
            client.fetch::<Page<Order>>(page("/api/orders/")),
            client.fetch::<Page<User>>(page("/api/users/")),
            client.fetch::<Page<Product>>(page("/api/products/")),
        )?;

        debug!(
            orders = orders.results.len(),
            users = users.results.len(),
            products = products.results.len(),
            "Loaded dashboard data"
        );

        Ok(Self::compute(
            orders.results,
            &users.results,
            products.results,
            Utc::now().date_naive(),
        ))
    }

    pub fn compute(
        orders: Vec<Order>,
        users: &[User],
        mut products: Vec<Product>,
        today: NaiveDate,
    ) -> Self {
        let total_sales: f64 = orders.iter().map(|o| o.total_price).sum();
        let orders_paid = orders.iter().filter(|o| o.is_paid).count();

        let last_7_days = (0..7)
            .rev()
            .map(|days_ago| {
                let date = today - Duration::days(days_ago);
                let sales = orders
                    .iter()
                    .filter(|o| order_date(o.created_at.as_deref()) == Some(date))
                    .map(|o| o.total_price)
                    .sum();
                DailySales {
                    date,
                    label: date.format("%a").to_string(),
                    sales,
                }
            })
            .collect();

        let mut monthly: Vec<MonthlyEarnings> = MONTHS
            .iter()
            .map(|&month| MonthlyEarnings { month, value: 0.0 })
            .collect();
        for order in &orders {
            if let Some(date) = order_date(order.created_at.as_deref()) {
                if let Some(slot) = monthly.get_mut(date.month0() as usize) {
                    slot.value += order.total_price;
                }
            }
        }

        let mut by_country: HashMap<&str, f64> = HashMap::new();
        for order in &orders {
            *by_country.entry(order.country()).or_default() += order.total_price;
        }
        let mut top_countries: Vec<CountrySales> = by_country
            .into_iter()
            .map(|(country, revenue)| CountrySales {
                country: country.to_string(),
                revenue,
            })
            .collect();
        // Ties broken by name so the listing is stable
        top_countries.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| a.country.cmp(&b.country))
        });
        top_countries.truncate(TOP_N);

        let product_count = products.len();
        products.sort_by(|a, b| b.price.total_cmp(&a.price));
        products.truncate(TOP_N);

        let order_count = orders.len();
        let recent_orders = orders.into_iter().take(TOP_N).collect();

        Self {
            total_sales,
            total_income: total_sales,
            orders_paid,
            order_count,
            user_count: users.len(),
            product_count,
            last_7_days,
            monthly,
            top_products: products,
            top_countries,
            recent_orders,
        }
    }
}
