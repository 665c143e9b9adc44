use async_trait::async_trait;
use serde_json::json;

use super::{format_date, Affordances, Collection, Notice, Payload, Table, View};
use crate::app::AppContext;
use crate::capability::ResourceKind;
use crate::resources::{ListQuery, Resource};
use crate::types::{Customer, Order, OrderStatus, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub customer_id: Option<RecordId>,
    pub status: OrderStatus,
}

pub struct OrdersView {
    list: Collection<Order>,
    customers_resource: Resource<Customer>,
    customers: Vec<Customer>,
    pub form: OrderForm,
}

impl OrdersView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            list: Collection::new(ctx, ResourceKind::Orders),
            customers_resource: Resource::new(ctx.api.clone(), ResourceKind::Customers),
            customers: Vec::new(),
            form: OrderForm::default(),
        }
    }

    pub fn items(&self) -> &[Order] {
        &self.list.items
    }

    /// Choices for the customer field.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn editing(&self) -> Option<RecordId> {
        self.list.editing
    }

    /// Server-side filters applied by the next refresh.
    pub fn filters_mut(&mut self) -> &mut ListQuery {
        &mut self.list.query
    }

    pub async fn refresh(&mut self) {
        self.list.refresh().await;
    }

    pub async fn load_customers(&mut self) {
        match self.customers_resource.list(&ListQuery::default()).await {
            Ok(customers) => self.customers = customers,
            Err(err) => self.list.notices.failure("Error fetching customers", &err),
        }
    }

    pub async fn set_search(&mut self, search: impl Into<String>) {
        self.list.query.search = Some(search.into());
        self.refresh().await;
    }

    pub async fn set_status_filter(&mut self, status: Option<OrderStatus>) {
        self.list.query.status = status.map(|s| s.as_str().to_string());
        self.refresh().await;
    }

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        let Some(order) = self.list.begin_edit(id).cloned() else {
            return false;
        };
        // order rows may only carry the customer's name
        let customer_id = order.customer_id.or_else(|| {
            let name = order.customer_name.as_deref()?;
            self.customers.iter().find(|c| c.name == name).map(|c| c.id)
        });
        self.form = OrderForm {
            customer_id,
            status: order.status,
        };
        true
    }

    pub fn cancel_edit(&mut self) {
        self.list.editing = None;
        self.form = OrderForm::default();
    }

    pub async fn submit(&mut self) -> bool {
        if !self.list.permit_write() {
            return false;
        }
        let Some(customer_id) = self.form.customer_id else {
            self.list.notices.alert("Customer and status are required");
            return false;
        };

        let body = json!({ "customer_id": customer_id, "status": self.form.status });
        let saved = self.list.save(Payload::Json(body), "order").await;
        if saved {
            self.form = OrderForm::default();
        }
        saved
    }

    pub async fn delete(&mut self, id: RecordId) -> bool {
        self.list.delete(id, "order").await
    }
}

#[async_trait]
impl View for OrdersView {
    fn title(&self) -> &'static str {
        "Orders"
    }

    async fn load(&mut self) {
        self.load_customers().await;
        self.refresh().await;
    }

    fn tables(&self) -> Vec<Table> {
        let mut table = Table::new(
            "Orders",
            &["ID", "Customer", "Email", "Status", "Created At"],
            "No orders found",
        );
        for order in &self.list.items {
            table.push(vec![
                order.order_id.to_string(),
                order.customer_name.clone().unwrap_or_default(),
                order.customer_email.clone().unwrap_or_default(),
                order.status.to_string(),
                format_date(order.created_at),
            ]);
        }
        vec![table.with_actions(self.affordances())]
    }

    fn affordances(&self) -> Affordances {
        self.list.affordances()
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.list.notices.take()
    }
}
