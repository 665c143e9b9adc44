//! Landing screen: headline KPIs, latest orders, and three chart series.
//! Each widget loads independently, so one failing endpoint does not blank
//! the others.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;

use super::{format_date, Affordances, Notice, Notices, Table, View};
use crate::app::AppContext;
use crate::error::ApiError;
use crate::http::{ApiClient, ApiRequest};
use crate::types::{
    CategorySales, CustomerSpend, Order, ProductSales, TotalCustomers, TotalOrders, TotalSales,
};

pub const RECENT_ORDER_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub total_customers: i64,
}

pub struct DashboardView {
    api: Arc<ApiClient>,
    pub kpis: Option<Kpis>,
    pub recent_orders: Vec<Order>,
    pub sales_by_category: Vec<CategorySales>,
    pub sales_by_product: Vec<ProductSales>,
    pub top_customers: Vec<CustomerSpend>,
    notices: Notices,
}

async fn fetch_kpis(api: &ApiClient) -> Result<Kpis, ApiError> {
    let (sales, orders, customers) = futures::try_join!(
        api.send_json::<TotalSales>(ApiRequest::get("/kpis/total-sales")),
        api.send_json::<TotalOrders>(ApiRequest::get("/kpis/total-orders")),
        api.send_json::<TotalCustomers>(ApiRequest::get("/kpis/total-customers")),
    )?;
    Ok(Kpis {
        total_sales: sales.total_sales,
        total_orders: orders.total_orders,
        total_customers: customers.total_customers,
    })
}

/// Newest first; undated orders sink to the bottom.
pub fn most_recent(mut orders: Vec<Order>, limit: usize) -> Vec<Order> {
    orders.sort_by_key(|order| Reverse(order.created_at));
    orders.truncate(limit);
    orders
}

impl DashboardView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api.clone(),
            kpis: None,
            recent_orders: Vec::new(),
            sales_by_category: Vec::new(),
            sales_by_product: Vec::new(),
            top_customers: Vec::new(),
            notices: Notices::default(),
        }
    }

    pub async fn refresh(&mut self) {
        let api = Arc::clone(&self.api);
        let (kpis, orders, by_category, by_product, top_customers) = futures::join!(
            fetch_kpis(&api),
            api.send_json::<Vec<Order>>(ApiRequest::get("/orders")),
            api.send_json::<Vec<CategorySales>>(ApiRequest::get("/charts/sales-by-category")),
            api.send_json::<Vec<ProductSales>>(ApiRequest::get("/charts/sales-by-product")),
            api.send_json::<Vec<CustomerSpend>>(ApiRequest::get("/charts/top-customers")),
        );

        match kpis {
            Ok(kpis) => self.kpis = Some(kpis),
            Err(err) => self.notices.failure("Error fetching KPIs", &err),
        }
        match orders {
            Ok(orders) => self.recent_orders = most_recent(orders, RECENT_ORDER_LIMIT),
            Err(err) => self.notices.failure("Error fetching recent orders", &err),
        }
        match by_category {
            Ok(rows) => self.sales_by_category = rows,
            Err(err) => self.notices.failure("Error fetching sales by category", &err),
        }
        match by_product {
            Ok(rows) => self.sales_by_product = rows,
            Err(err) => self.notices.failure("Error fetching sales by product", &err),
        }
        match top_customers {
            Ok(rows) => self.top_customers = rows,
            Err(err) => self.notices.failure("Error fetching top customers", &err),
        }
    }
}

#[async_trait]
impl View for DashboardView {
    fn title(&self) -> &'static str {
        "Dashboard"
    }

    async fn load(&mut self) {
        self.refresh().await;
    }

    fn tables(&self) -> Vec<Table> {
        let mut kpis = Table::new("Key figures", &["Metric", "Value"], "No figures available");
        if let Some(k) = &self.kpis {
            kpis.push(vec!["Total Sales".into(), format!("${}", k.total_sales)]);
            kpis.push(vec!["Total Orders".into(), k.total_orders.to_string()]);
            kpis.push(vec!["Total Customers".into(), k.total_customers.to_string()]);
        }

        let mut recent = Table::new(
            "Recent Orders",
            &["Order ID", "Customer", "Status", "Date"],
            "No recent orders",
        );
        for order in &self.recent_orders {
            recent.push(vec![
                order.order_id.to_string(),
                order.customer_name.clone().unwrap_or_default(),
                order.status.to_string(),
                format_date(order.created_at),
            ]);
        }

        let mut by_category = Table::new(
            "Sales by Category",
            &["Category", "Sales"],
            "No category sales data available",
        );
        for row in &self.sales_by_category {
            by_category.push(vec![row.category_name.clone(), format!("${}", row.total_sales)]);
        }

        let mut by_product = Table::new(
            "Sales by Product",
            &["Product", "Sales"],
            "No product sales data available",
        );
        for row in &self.sales_by_product {
            by_product.push(vec![row.product_name.clone(), format!("${}", row.total_sales)]);
        }

        let mut top = Table::new(
            "Top Customers",
            &["Customer", "Total Spent"],
            "No customer data available",
        );
        for row in &self.top_customers {
            top.push(vec![row.customer_name.clone(), format!("${}", row.total_spent)]);
        }

        vec![kpis, recent, by_category, by_product, top]
    }

    fn affordances(&self) -> Affordances {
        Affordances::default()
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}
