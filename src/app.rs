//! Application shell: wires the client to the session and decides which
//! screen a path shows for the current identity.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::guard::{resolve, sidebar_links, Navigation, Route, DEFAULT_ROUTE};
use crate::http::{ApiClient, ReqwestTransport, SessionJar, Transport};
use crate::session::{SessionState, SessionStore};
use crate::types::{Identity, Role};
use crate::views::{CustomersView, DashboardView, OrdersView, ProductsView, UsersView, View};

// Redirects never chain further than login -> dashboard.
const MAX_REDIRECTS: usize = 3;

/// Shared handles every view is built from.
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<ApiClient>,
    pub session: SessionStore,
}

impl AppContext {
    pub fn new(config: &AppConfig, jar: Arc<SessionJar>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config.client.api_url, jar, config.client.timeout())?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &AppConfig) -> Self {
        let session = SessionStore::new();
        let api = Arc::new(ApiClient::new(transport, session.clone(), &config.client));
        Self { api, session }
    }

    /// Restore the session from stored credentials.
    pub async fn start(&self) {
        self.session.initialize(&self.api).await;
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        self.session.login(&self.api, email, password).await
    }

    pub async fn logout(&self) {
        self.session.logout(&self.api).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Startup profile fetch still in flight.
    Loading,
    Login,
    Register,
    AccessDenied { requested: Route, fallback: Route },
    View(Route),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavBar {
    pub username: String,
    pub role: Role,
    pub signed_in: bool,
}

pub struct Shell {
    ctx: AppContext,
    path: String,
    changes: watch::Receiver<SessionState>,
}

impl Shell {
    pub fn new(ctx: AppContext) -> Self {
        let changes = ctx.session.subscribe();
        Self {
            ctx,
            path: DEFAULT_ROUTE.path().to_string(),
            changes,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Path the shell currently sits on, after any redirects.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn navigate(&mut self, path: &str) -> Screen {
        self.path = path.to_string();
        self.screen()
    }

    pub fn go_to_default(&mut self) -> Screen {
        self.navigate(DEFAULT_ROUTE.path())
    }

    /// Evaluate the current path against the current identity, following
    /// redirects.
    pub fn screen(&mut self) -> Screen {
        let state = self.changes.borrow_and_update().clone();
        if state.loading {
            return Screen::Loading;
        }

        for _ in 0..MAX_REDIRECTS {
            match resolve(state.identity.as_ref(), &self.path) {
                Navigation::Show(Route::Login) => return Screen::Login,
                Navigation::Show(Route::Register) => return Screen::Register,
                Navigation::Show(route) => return Screen::View(route),
                Navigation::AccessDenied { requested } => {
                    tracing::info!(route = requested.path(), "access denied");
                    return Screen::AccessDenied {
                        requested,
                        fallback: DEFAULT_ROUTE,
                    };
                }
                Navigation::Redirect(route) => {
                    tracing::debug!(from = %self.path, to = route.path(), "redirect");
                    self.path = route.path().to_string();
                }
            }
        }
        tracing::warn!(path = %self.path, "redirect loop, showing login");
        Screen::Login
    }

    /// Wait for the session to change, then re-evaluate. `None` once the
    /// store is gone.
    pub async fn next_change(&mut self) -> Option<Screen> {
        self.changes.changed().await.ok()?;
        Some(self.screen())
    }

    pub fn sidebar(&self) -> Vec<Route> {
        sidebar_links(self.ctx.identity().as_ref())
    }

    pub fn navbar(&self) -> NavBar {
        match self.ctx.identity() {
            Some(identity) => NavBar {
                username: identity.username,
                role: identity.role,
                signed_in: true,
            },
            None => NavBar {
                username: "Guest".to_string(),
                role: Role::Viewer,
                signed_in: false,
            },
        }
    }

    /// Data view behind a route. Login and register are forms, not views.
    pub fn view_for(&self, route: Route) -> Option<Box<dyn View>> {
        view_for(&self.ctx, route)
    }
}

pub fn view_for(ctx: &AppContext, route: Route) -> Option<Box<dyn View>> {
    let view: Box<dyn View> = match route {
        Route::Dashboard => Box::new(DashboardView::new(ctx)),
        Route::Users => Box::new(UsersView::new(ctx)),
        Route::Customers => Box::new(CustomersView::new(ctx)),
        Route::Products => Box::new(ProductsView::new(ctx)),
        Route::Orders => Box::new(OrdersView::new(ctx)),
        Route::Login | Route::Register => return None,
    };
    Some(view)
}
