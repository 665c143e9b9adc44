//! Routes and the role guard in front of them.

use crate::types::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Users,
    Customers,
    Products,
    Orders,
}

/// Where an authenticated user lands by default, and where the
/// access-denied screen points back to.
pub const DEFAULT_ROUTE: Route = Route::Dashboard;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_OR_EDITOR: &[Role] = &[Role::Admin, Role::Editor];

/// Sidebar order
const NAVIGATION: [Route; 5] = [
    Route::Dashboard,
    Route::Users,
    Route::Customers,
    Route::Products,
    Route::Orders,
];

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Users => "/users",
            Route::Customers => "/customers",
            Route::Products => "/products",
            Route::Orders => "/orders",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Register => "Sign Up",
            Route::Dashboard => "Dashboard",
            Route::Users => "Users",
            Route::Customers => "Customers",
            Route::Products => "Products",
            Route::Orders => "Orders",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        match normalize(path).as_str() {
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/dashboard" => Some(Route::Dashboard),
            "/users" => Some(Route::Users),
            "/customers" => Some(Route::Customers),
            "/products" => Some(Route::Products),
            "/orders" => Some(Route::Orders),
            _ => None,
        }
    }

    /// Public routes are only meaningful while signed out.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// `None` means any signed-in role may render the route.
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Users => Some(ADMIN_ONLY),
            Route::Customers => Some(ADMIN_OR_EDITOR),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    RedirectToLogin,
    AccessDenied,
}

pub fn guard(identity: Option<&Identity>, required: Option<&[Role]>) -> GuardDecision {
    match (identity, required) {
        (None, _) => GuardDecision::RedirectToLogin,
        (Some(_), None) => GuardDecision::Render,
        (Some(identity), Some(roles)) if roles.contains(&identity.role) => GuardDecision::Render,
        (Some(_), Some(_)) => GuardDecision::AccessDenied,
    }
}

/// Outcome of navigating to a path with the current identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Show(Route),
    Redirect(Route),
    AccessDenied { requested: Route },
}

pub fn resolve(identity: Option<&Identity>, path: &str) -> Navigation {
    let signed_in = identity.is_some();
    let home = if signed_in { DEFAULT_ROUTE } else { Route::Login };

    let route = match Route::from_path(path) {
        Some(route) => route,
        // "/" and anything unknown fall through to the landing page
        None => return Navigation::Redirect(home),
    };

    if route.is_public() {
        return if signed_in {
            Navigation::Redirect(DEFAULT_ROUTE)
        } else {
            Navigation::Show(route)
        };
    }

    match guard(identity, route.required_roles()) {
        GuardDecision::Render => Navigation::Show(route),
        GuardDecision::RedirectToLogin => Navigation::Redirect(Route::Login),
        GuardDecision::AccessDenied => Navigation::AccessDenied { requested: route },
    }
}

/// Links the sidebar shows: exactly the routes the guard would render.
pub fn sidebar_links(identity: Option<&Identity>) -> Vec<Route> {
    NAVIGATION
        .into_iter()
        .filter(|route| guard(identity, route.required_roles()) == GuardDecision::Render)
        .collect()
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_ascii_lowercase()
    } else {
        format!("/{}", trimmed.to_ascii_lowercase())
    }
}
