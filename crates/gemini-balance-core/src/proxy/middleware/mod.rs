// Middleware module - Axum middleware

pub mod monitor;

pub use monitor::metrics_middleware;
