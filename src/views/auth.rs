use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Notice, Notices};
use crate::app::AppContext;
use crate::error::ApiError;
use crate::guard::Route;
use crate::http::{ApiClient, ApiRequest};
use crate::session::SessionStore;
use crate::types::Identity;

pub const REGISTER_PATH: &str = "/auth/register";
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub struct LoginView {
    api: Arc<ApiClient>,
    session: SessionStore,
    pub form: LoginForm,
    notices: Notices,
}

impl LoginView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api.clone(),
            session: ctx.session.clone(),
            form: LoginForm::default(),
            notices: Notices::default(),
        }
    }

    /// Sign in with the form's credentials. The password is cleared either way.
    pub async fn submit(&mut self) -> Option<Identity> {
        let password = std::mem::take(&mut self.form.password);
        match self.session.login(&self.api, self.form.email.trim(), &password).await {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                let message = match err {
                    ApiError::Transport(_) | ApiError::Decode(_) => "Login failed".to_string(),
                    other => other.message().to_string(),
                };
                self.notices.alert(message);
                None
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn password_is_strong(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

impl RegisterForm {
    /// Check every field before anything is sent. All problems are reported
    /// at once, keyed by field name.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = BTreeMap::new();

        if self.username.trim().is_empty() {
            errors.insert("username".to_string(), "Username is required".to_string());
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email".to_string(), "Email is required".to_string());
        } else if !EMAIL_PATTERN.is_match(email) {
            errors.insert("email".to_string(), "Email is not valid".to_string());
        }

        if self.password.is_empty() {
            errors.insert("password".to_string(), "Password is required".to_string());
        } else if !password_is_strong(&self.password) {
            errors.insert(
                "password".to_string(),
                "Password must be at least 6 characters and include a number".to_string(),
            );
        }

        if self.confirm_password.is_empty() {
            errors.insert("confirm_password".to_string(), "Confirm your password".to_string());
        } else if self.confirm_password != self.password {
            errors.insert("confirm_password".to_string(), "Passwords do not match".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Please fix the highlighted fields", errors))
        }
    }
}

/// Account creation. A successful registration does not sign in; the
/// caller is sent to the login screen instead.
pub struct RegisterView {
    api: Arc<ApiClient>,
    pub form: RegisterForm,
    field_errors: BTreeMap<String, String>,
    notices: Notices,
}

impl RegisterView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api.clone(),
            form: RegisterForm::default(),
            field_errors: BTreeMap::new(),
            notices: Notices::default(),
        }
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Returns where to go next on success.
    pub async fn submit(&mut self) -> Option<Route> {
        if let Err(err) = self.form.validate() {
            if let ApiError::Validation { field_errors, .. } = &err {
                self.field_errors = field_errors.clone();
            }
            self.notices.alert(err.message());
            return None;
        }
        self.field_errors.clear();

        let request = match ApiRequest::post(REGISTER_PATH).json(&json!({
            "username": self.form.username.trim(),
            "email": self.form.email.trim(),
            "password": self.form.password,
        })) {
            Ok(request) => request,
            Err(err) => {
                self.notices.failure("Registration failed", &err);
                return None;
            }
        };

        match self.api.send(request).await {
            Ok(_) => {
                tracing::info!(username = %self.form.username.trim(), "registered");
                self.form = RegisterForm::default();
                Some(Route::Login)
            }
            Err(err) => {
                self.notices.failure("Registration failed", &err);
                None
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}
