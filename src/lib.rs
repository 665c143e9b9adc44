pub mod app;
pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod resources;
pub mod session;
pub mod types;
pub mod views;

pub use app::{AppContext, Screen, Shell};
pub use error::ApiError;
pub use session::SessionStore;
