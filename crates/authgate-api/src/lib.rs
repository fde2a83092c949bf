// Authgate API Library
// Decision: Shared library for binaries (API server, OpenAPI export) and integration tests

// Application assembly (state, router, middleware stack)
pub mod app;

// API routes and types
pub mod api;

// Authentication strategies and the request guard
pub mod auth;

// Environment configuration
pub mod config;

// OpenAPI spec generation
pub mod openapi;

pub use app::{build_app, build_router, App, AppState};
pub use config::ApiConfig;
