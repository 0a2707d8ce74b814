pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod schema;
pub mod state;
pub mod views;

pub use app::app;
pub use state::AppState;
