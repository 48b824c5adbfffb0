use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    db::SharedGateway,
    handlers::{
        hello,
        words::{list_words, store_word},
    },
    middleware::create_middleware_stack,
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(gateway: SharedGateway) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/store", post(store_word))
        .route("/list", get(list_words))
        // Persistence gateway shared by every handler
        .with_state(gateway)
        .layer(create_middleware_stack())
}
