// Handlers module
// HTTP handlers for the word service

pub mod words;

use axum::{http::StatusCode, response::IntoResponse};

pub const GREETING: &str = "Hello, World!";

/// Greeting handler
/// GET /
pub async fn hello() -> impl IntoResponse {
    (StatusCode::OK, GREETING)
}
