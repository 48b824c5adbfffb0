// Library root for the word store API

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;

// Re-export commonly used types
pub use db::{Database, PersistenceGateway, SharedGateway, TextRow};
pub use error::{ApiError, GatewayError};
pub use models::{StoreWordRequest, Word};
pub use router::create_router;
