use async_trait::async_trait;
use serde_json::json;

use super::{filled, format_date, Affordances, Collection, Notice, Payload, Table, View};
use crate::app::AppContext;
use crate::capability::ResourceKind;
use crate::resources::ListQuery;
use crate::types::{Customer, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub struct CustomersView {
    list: Collection<Customer>,
    pub form: CustomerForm,
}

impl CustomersView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            list: Collection::new(ctx, ResourceKind::Customers),
            form: CustomerForm::default(),
        }
    }

    pub fn items(&self) -> &[Customer] {
        &self.list.items
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

    pub async fn set_search(&mut self, search: impl Into<String>) {
        self.list.query.search = Some(search.into());
        self.refresh().await;
    }

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        let Some(customer) = self.list.begin_edit(id).cloned() else {
            return false;
        };
        self.form = CustomerForm {
            name: customer.name,
            email: customer.email,
            phone: customer.phone.unwrap_or_default(),
        };
        true
    }

    pub fn cancel_edit(&mut self) {
        self.list.editing = None;
        self.form = CustomerForm::default();
    }

    pub async fn submit(&mut self) -> bool {
        if !self.list.permit_write() {
            return false;
        }
        let (Some(name), Some(email)) = (filled(&self.form.name), filled(&self.form.email)) else {
            self.list.notices.alert("Name and Email are required");
            return false;
        };

        let body = json!({
            "name": name,
            "email": email,
            "phone": self.form.phone.trim(),
        });

        let saved = self.list.save(Payload::Json(body), "customer").await;
        if saved {
            self.form = CustomerForm::default();
        }
        saved
    }

    pub async fn delete(&mut self, id: RecordId) -> bool {
        self.list.delete(id, "customer").await
    }
}

#[async_trait]
impl View for CustomersView {
    fn title(&self) -> &'static str {
        "Customers"
    }

    async fn load(&mut self) {
        self.refresh().await;
    }

    fn tables(&self) -> Vec<Table> {
        let mut table = Table::new(
            "Customers",
            &["ID", "Name", "Email", "Phone", "Created At"],
            "No customers found",
        );
        for customer in &self.list.items {
            table.push(vec![
                customer.id.to_string(),
                customer.name.clone(),
                customer.email.clone(),
                customer.phone.clone().unwrap_or_default(),
                format_date(customer.created_at),
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
