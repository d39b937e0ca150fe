// handlers/mod.rs - HTTP handlers
//
// Handlers never check identity themselves; the gates in
// crate::middleware::guards are attached per route group in crate::app.

pub mod auth;
pub mod companies;
pub mod users;
pub mod validate;
