use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Failures raised by the persistence gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Row decode failed: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{message}: {source}")]
    Persistence {
        message: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("{message}: {source}")]
    Encoding {
        message: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        Self::MalformedRequest(err.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn persistence(message: &'static str, source: GatewayError) -> Self {
        Self::Persistence { message, source }
    }

    pub fn encoding(message: &'static str, source: serde_json::Error) -> Self {
        Self::Encoding { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence { .. } | ApiError::Encoding { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Callers only ever see a fixed plaintext message; the cause stays in the logs.
        let message = match self {
            ApiError::MalformedRequest(ref detail) => {
                tracing::debug!("Rejected malformed request body: {}", detail);
                "Invalid request payload".to_string()
            }
            ApiError::Validation(message) => {
                tracing::debug!("Request validation failed: {}", message);
                message
            }
            ApiError::Persistence { message, ref source } => {
                match source {
                    GatewayError::Connection(_) | GatewayError::Pool(_) => {
                        tracing::error!("PostgreSQL connection issue: {}", source)
                    }
                    _ => tracing::error!("PostgreSQL operation failed: {}", source),
                }
                message.to_string()
            }
            ApiError::Encoding { message, ref source } => {
                tracing::error!("Response serialization failed: {}", source);
                message.to_string()
            }
        };

        (status, message).into_response()
    }
}

// PostgreSQL error mapping
impl From<tokio_postgres::Error> for GatewayError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.code() {
            Some(&SqlState::CONNECTION_EXCEPTION)
            | Some(&SqlState::CONNECTION_DOES_NOT_EXIST)
            | Some(&SqlState::CONNECTION_FAILURE)
            | Some(&SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION)
            | Some(&SqlState::ADMIN_SHUTDOWN) => GatewayError::Connection(err.to_string()),
            Some(code) => GatewayError::Statement(format!("{} (code: {})", err, code.code())),
            // No SQLSTATE means the server never answered: I/O or a closed connection.
            None => GatewayError::Connection(err.to_string()),
        }
    }
}

// Connection pool error mapping
impl From<deadpool_postgres::PoolError> for GatewayError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Timeout(kind) => {
                tracing::warn!("Database connection pool timeout: {:?}", kind);
                GatewayError::Pool("Database connection timeout".to_string())
            }
            deadpool_postgres::PoolError::Closed => {
                GatewayError::Pool("Database connection pool is closed".to_string())
            }
            deadpool_postgres::PoolError::Backend(e) => GatewayError::from(e),
            other => GatewayError::Pool(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
