pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod database;
pub mod domain;
pub mod entity;
pub mod error;
pub mod notify;
pub mod service;
pub mod store;
pub mod utils;
pub mod views;

#[cfg(test)]
mod testing;

pub use app::AppState;
pub use config::AppConfig;
pub use error::AppError;
