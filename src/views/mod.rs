//! View models for each screen.
//!
//! A view fetches its own data, keeps its own form state, and derives what
//! the user may do from the session's identity each time it is asked.
//! Rendering is left to the caller; views only produce [`Table`]s.

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::app::AppContext;
use crate::capability::{capabilities_for, Capabilities, ResourceKind};
use crate::error::ApiError;
use crate::http::FormField;
use crate::resources::{ListQuery, Resource};
use crate::session::SessionStore;
use crate::types::{Record, RecordId};

pub use auth::{LoginView, RegisterForm, RegisterView};
pub use customers::CustomersView;
pub use dashboard::DashboardView;
pub use orders::OrdersView;
pub use products::ProductsView;
pub use users::UsersView;

pub const ACCESS_DENIED: &str = "Access denied";

/// Something the user must be told about, shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Alert(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Alert(message) => message,
        }
    }
}

/// Which controls a view offers. Derived from capabilities on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Affordances {
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Affordances {
    pub fn from_capabilities(caps: Capabilities) -> Self {
        Self {
            add: caps.create,
            edit: caps.edit,
            delete: caps.delete,
        }
    }

    /// Whether rows get an actions column at all.
    pub fn has_row_actions(&self) -> bool {
        self.edit || self.delete
    }

    fn row_actions(&self) -> String {
        let mut actions = Vec::new();
        if self.edit {
            actions.push("edit");
        }
        if self.delete {
            actions.push("delete");
        }
        actions.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub empty_message: String,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&str], empty_message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            empty_message: empty_message.into(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Add the actions column when the affordances call for one.
    fn with_actions(mut self, affordances: Affordances) -> Self {
        if affordances.has_row_actions() {
            self.headers.push("Actions".to_string());
            let actions = affordances.row_actions();
            for row in &mut self.rows {
                row.push(actions.clone());
            }
        }
        self
    }
}

#[async_trait]
pub trait View: Send {
    fn title(&self) -> &'static str;

    /// Initial fetch of everything the screen shows.
    async fn load(&mut self);

    fn tables(&self) -> Vec<Table>;

    fn affordances(&self) -> Affordances;

    fn take_notices(&mut self) -> Vec<Notice>;
}

#[derive(Debug, Default)]
pub(crate) struct Notices(Vec<Notice>);

impl Notices {
    pub(crate) fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "alert");
        self.0.push(Notice::Alert(message));
    }

    pub(crate) fn failure(&mut self, context: &str, err: &ApiError) {
        tracing::error!(error = %err, "{}", context);
        self.0.push(Notice::Alert(format!("{}: {}", context, err.message())));
    }

    pub(crate) fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.0)
    }
}

pub(crate) enum Payload {
    Json(Value),
    Multipart(Vec<(String, FormField)>),
}

/// List state shared by the CRUD views: rows, filters, the record being
/// edited, and the write-then-refetch cycle.
pub(crate) struct Collection<T> {
    session: SessionStore,
    resource: Resource<T>,
    pub(crate) items: Vec<T>,
    pub(crate) query: ListQuery,
    pub(crate) editing: Option<RecordId>,
    pub(crate) notices: Notices,
}

impl<T: DeserializeOwned + Record + Send> Collection<T> {
    pub(crate) fn new(ctx: &AppContext, kind: ResourceKind) -> Self {
        Self {
            session: ctx.session.clone(),
            resource: Resource::new(ctx.api.clone(), kind),
            items: Vec::new(),
            query: ListQuery::default(),
            editing: None,
            notices: Notices::default(),
        }
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        capabilities_for(self.session.identity().as_ref(), self.resource.kind())
    }

    pub(crate) fn affordances(&self) -> Affordances {
        Affordances::from_capabilities(self.capabilities())
    }

    pub(crate) fn find(&self, id: RecordId) -> Option<&T> {
        self.items.iter().find(|item| item.record_id() == id)
    }

    /// Refetch with the current filters. On failure the old rows stay.
    pub(crate) async fn refresh(&mut self) -> bool {
        match self.resource.list(&self.query).await {
            Ok(items) => {
                self.items = items;
                true
            }
            Err(err) => {
                let context = format!("Error fetching {}", self.resource.kind().label());
                self.notices.failure(&context, &err);
                false
            }
        }
    }

    /// Alert and refuse when the capability is missing.
    pub(crate) fn permit(&mut self, allowed: bool, refusal: &str) -> bool {
        if !allowed {
            self.notices.alert(refusal);
        }
        allowed
    }

    pub(crate) fn permit_write(&mut self) -> bool {
        let caps = self.capabilities();
        let allowed = if self.editing.is_some() { caps.edit } else { caps.create };
        self.permit(allowed, ACCESS_DENIED)
    }

    pub(crate) fn begin_edit(&mut self, id: RecordId) -> Option<&T> {
        if !self.permit(self.capabilities().edit, ACCESS_DENIED) {
            return None;
        }
        if self.find(id).is_none() {
            self.notices.alert(format!("No {} record with id {}", self.resource.kind().label(), id));
            return None;
        }
        self.editing = Some(id);
        self.find(id)
    }

    /// Create or update depending on the edit state, then refetch. The
    /// refetch is only issued once the write has resolved.
    pub(crate) async fn save(&mut self, payload: Payload, what: &str) -> bool {
        let result = match (self.editing, payload) {
            (Some(id), Payload::Json(body)) => self.resource.update(id, &body).await,
            (Some(id), Payload::Multipart(fields)) => self.resource.update_multipart(id, fields).await,
            (None, Payload::Json(body)) => self.resource.create(&body).await,
            (None, Payload::Multipart(fields)) => self.resource.create_multipart(fields).await,
        };

        match result {
            Ok(_) => {
                self.editing = None;
                self.refresh().await;
                true
            }
            Err(err) => {
                self.notices.failure(&format!("Error saving {}", what), &err);
                false
            }
        }
    }

    pub(crate) async fn delete(&mut self, id: RecordId, what: &str) -> bool {
        let refusal = format!("Admins only can delete {}.", self.resource.kind().label());
        if !self.permit(self.capabilities().delete, &refusal) {
            return false;
        }

        match self.resource.delete(id).await {
            Ok(()) => {
                if self.editing == Some(id) {
                    self.editing = None;
                }
                self.refresh().await;
                true
            }
            Err(err) => {
                self.notices.failure(&format!("Error deleting {}", what), &err);
                false
            }
        }
    }
}

pub(crate) fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Trimmed text, or `None` when blank.
pub(crate) fn filled(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}
