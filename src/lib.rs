pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod sql;

pub use app::app;

#[cfg(test)]
pub mod testing;
