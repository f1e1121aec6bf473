pub mod app;
pub mod config;
pub mod cqrs;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod patch;

pub use app::{app, AppState};
