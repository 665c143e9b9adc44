use async_trait::async_trait;
use serde_json::json;

use super::{filled, format_date, Affordances, Collection, Notice, Payload, Table, View};
use crate::app::AppContext;
use crate::capability::ResourceKind;
use crate::resources::ListQuery;
use crate::types::{RecordId, Role, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    /// Only sent when creating.
    pub password: String,
    pub role: Option<Role>,
}

/// User management. Only admins can reach it; for anyone else the view
/// stays empty and issues no requests.
pub struct UsersView {
    list: Collection<User>,
    pub form: UserForm,
}

impl UsersView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            list: Collection::new(ctx, ResourceKind::Users),
            form: UserForm::default(),
        }
    }

    pub fn can_manage(&self) -> bool {
        !self.list.capabilities().is_read_only()
    }

    pub fn items(&self) -> &[User] {
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
        if self.can_manage() {
            self.list.refresh().await;
        }
    }

    pub async fn set_search(&mut self, search: impl Into<String>) {
        self.list.query.search = Some(search.into());
        self.refresh().await;
    }

    pub async fn set_role_filter(&mut self, role: Option<Role>) {
        self.list.query.role = role.map(|r| r.as_str().to_string());
        self.refresh().await;
    }

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        let Some(user) = self.list.begin_edit(id).cloned() else {
            return false;
        };
        self.form = UserForm {
            username: user.username,
            email: user.email,
            password: String::new(),
            role: Some(user.role),
        };
        true
    }

    pub fn cancel_edit(&mut self) {
        self.list.editing = None;
        self.form = UserForm::default();
    }

    pub async fn submit(&mut self) -> bool {
        if !self.list.permit_write() {
            return false;
        }

        let creating = self.list.editing.is_none();
        let (Some(username), Some(email), Some(role)) =
            (filled(&self.form.username), filled(&self.form.email), self.form.role)
        else {
            self.list.notices.alert("Username, email and role are required");
            return false;
        };
        if creating && self.form.password.is_empty() {
            self.list.notices.alert("Password is required for new users");
            return false;
        }

        let body = if creating {
            json!({
                "username": username,
                "email": email,
                "password": self.form.password,
                "role": role,
            })
        } else {
            json!({ "username": username, "email": email, "role": role })
        };

        let saved = self.list.save(Payload::Json(body), "user").await;
        if saved {
            self.form = UserForm::default();
        }
        saved
    }

    pub async fn delete(&mut self, id: RecordId) -> bool {
        self.list.delete(id, "user").await
    }
}

#[async_trait]
impl View for UsersView {
    fn title(&self) -> &'static str {
        "Users"
    }

    async fn load(&mut self) {
        self.refresh().await;
    }

    fn tables(&self) -> Vec<Table> {
        let empty = if self.can_manage() {
            "No users found"
        } else {
            "You do not have access to manage users."
        };
        let mut table = Table::new(
            "Users",
            &["ID", "Username", "Email", "Role", "Created At"],
            empty,
        );
        for user in &self.list.items {
            table.push(vec![
                user.id.to_string(),
                user.username.clone(),
                user.email.clone(),
                user.role.to_string(),
                format_date(user.created_at),
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
