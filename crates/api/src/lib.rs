//! HTTP API: configuration, routing, and mapping job outcomes to responses.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
