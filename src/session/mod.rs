//! Session store: the signed-in identity and its lifecycle.
//!
//! The store is a cheap handle; clones share one state. It is the only
//! writer of the identity. Everything else reads it, or subscribes to be
//! told when it changes.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ApiError;
use crate::http::{ApiClient, ApiRequest};
use crate::types::Identity;

pub const PROFILE_PATH: &str = "/auth/profile";
pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True until the startup profile fetch settles.
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: Identity,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState {
            identity: None,
            loading: true,
        });
        Self {
            state: Arc::new(state),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Startup: derive the identity from whatever session the cookies carry.
    /// No session is the signed-out state, not an error.
    pub async fn initialize(&self, api: &ApiClient) {
        self.state.send_if_modified(|state| {
            let changed = !state.loading;
            state.loading = true;
            changed
        });

        let identity = match api.send_json::<Identity>(ApiRequest::get(PROFILE_PATH)).await {
            Ok(identity) => {
                tracing::info!(user = %identity.username, role = %identity.role, "session restored");
                Some(identity)
            }
            Err(err) => {
                tracing::debug!(error = %err, "no active session");
                None
            }
        };

        self.state.send_modify(|state| {
            state.identity = identity;
            state.loading = false;
        });
    }

    /// Sign in. On failure the error is returned and the state is untouched.
    pub async fn login(&self, api: &ApiClient, email: &str, password: &str) -> Result<Identity, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH).json(&json!({
            "email": email,
            "password": password,
        }))?;
        let response: LoginResponse = api.send_json(request).await?;

        tracing::info!(user = %response.user.username, role = %response.user.role, "signed in");
        self.replace(Some(response.user.clone()));
        Ok(response.user)
    }

    /// Sign out. Always ends signed out, whether or not the server call works.
    pub async fn logout(&self, api: &ApiClient) {
        if let Err(err) = api.send(ApiRequest::post(LOGOUT_PATH)).await {
            tracing::warn!(error = %err, "logout request failed; clearing local session anyway");
        }
        api.clear_credentials();
        self.replace(None);
        tracing::info!("signed out");
    }

    /// Forced sign-out after an unrecoverable renewal failure.
    pub(crate) fn expire(&self) {
        self.replace(None);
    }

    pub(crate) fn replace(&self, identity: Option<Identity>) {
        self.state.send_if_modified(|state| {
            let changed = state.identity != identity || state.loading;
            state.identity = identity;
            state.loading = false;
            changed
        });
    }
}
