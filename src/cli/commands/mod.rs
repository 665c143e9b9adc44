pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod open;
pub mod orders;
pub mod products;
pub mod server;
pub mod users;
