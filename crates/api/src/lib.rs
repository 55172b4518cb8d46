//! HTTP surface: credential extraction, the two pipeline stages, route
//! wiring, and process configuration.

pub mod app;
pub mod config;
pub mod context;
pub mod errors;
pub mod extract;
pub mod middleware;
