use crate::config::{ConnectionTarget, DatabaseConfig};
use crate::error::GatewayError;
use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tracing::{error, info, warn};

/// The persistence primitives the handlers are written against.
///
/// Implementations must be safe to share across concurrent requests; handlers
/// hold no locks of their own.
#[async_trait]
pub trait PersistenceGateway: Send + Sync + 'static {
    /// Run a statement and return the number of affected rows.
    async fn execute(&self, statement: &str, params: &[&str]) -> Result<u64, GatewayError>;

    /// Run a query and return every row it produced.
    async fn query(&self, statement: &str, params: &[&str]) -> Result<Vec<TextRow>, GatewayError>;
}

/// Gateway handle as shared through the router state.
pub type SharedGateway = Arc<dyn PersistenceGateway>;

/// A result row whose columns were read as nullable text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRow {
    columns: Vec<Option<String>>,
}

impl TextRow {
    pub fn new(columns: Vec<Option<String>>) -> Self {
        Self { columns }
    }

    /// Build a row from non-null values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(values.into_iter().map(|v| Some(v.into())).collect())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Text of column `idx`; NULL and missing columns are decode failures.
    pub fn get(&self, idx: usize) -> Result<&str, GatewayError> {
        match self.columns.get(idx) {
            Some(Some(value)) => Ok(value.as_str()),
            Some(None) => Err(GatewayError::decode(format!("column {} is NULL", idx))),
            None => Err(GatewayError::decode(format!(
                "column {} out of range for row with {} columns",
                idx,
                self.columns.len()
            ))),
        }
    }
}

impl TryFrom<&tokio_postgres::Row> for TextRow {
    type Error = GatewayError;

    fn try_from(row: &tokio_postgres::Row) -> Result<Self, Self::Error> {
        let columns = (0..row.len())
            .map(|idx| {
                row.try_get::<_, Option<String>>(idx)
                    .map_err(|e| GatewayError::decode(format!("column {}: {}", idx, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TextRow::new(columns))
    }
}

/// PostgreSQL-backed gateway over a deadpool connection pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Build the pool and probe it once; callers treat failure as fatal.
    pub async fn connect(config: DatabaseConfig) -> Result<Self, GatewayError> {
        info!("Creating PostgreSQL connection pool for {}", config.describe());

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, GatewayError> {
        let mut pg_config = Config::new();

        match config.target {
            // The URL carries its own sslmode; tokio-postgres reads it.
            ConnectionTarget::Url(url) => {
                pg_config.url = Some(url);
            }
            ConnectionTarget::Components { host, port, database, username, password } => {
                pg_config.host = Some(host);
                pg_config.port = Some(port);
                pg_config.dbname = Some(database);
                pg_config.user = Some(username);
                pg_config.password = password;

                pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
                    "disable" => deadpool_postgres::SslMode::Disable,
                    "prefer" => deadpool_postgres::SslMode::Prefer,
                    "require" => deadpool_postgres::SslMode::Require,
                    other => {
                        warn!("Unknown SSL mode '{}', defaulting to 'disable'", other);
                        deadpool_postgres::SslMode::Disable
                    }
                });
            }
        }

        pg_config.connect_timeout = Some(config.connection_timeout);

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                GatewayError::Connection(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                GatewayError::Connection(format!("Connection pool creation failed: {}", e))
            })
    }

    async fn get_connection(&self) -> Result<Object, GatewayError> {
        self.pool.get().await.map_err(GatewayError::from)
    }

    /// Borrow a connection and run `SELECT 1` through it.
    pub async fn test_connection(&self) -> Result<(), GatewayError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                GatewayError::from(e)
            })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// Close the pool; outstanding connections are dropped as they return.
    pub fn close(&self) {
        self.pool.close();
        info!("Database connection pool closed");
    }
}

fn bind<'a>(params: &'a [&'a str]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

#[async_trait]
impl PersistenceGateway for Database {
    async fn execute(&self, statement: &str, params: &[&str]) -> Result<u64, GatewayError> {
        let client = self.get_connection().await?;
        let affected = client.execute(statement, &bind(params)).await?;
        Ok(affected)
    }

    async fn query(&self, statement: &str, params: &[&str]) -> Result<Vec<TextRow>, GatewayError> {
        let client = self.get_connection().await?;
        let rows = client.query(statement, &bind(params)).await?;

        rows.iter().map(TextRow::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_text_row_get() {
        let row = TextRow::from_values(["hello"]);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get(0).unwrap(), "hello");
    }

    #[test]
    fn test_text_row_null_is_decode_error() {
        let row = TextRow::new(vec![None]);
        assert!(matches!(row.get(0), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_text_row_out_of_range_is_decode_error() {
        let row = TextRow::from_values(["hello"]);
        assert!(matches!(row.get(1), Err(GatewayError::Decode(_))));
        assert!(TextRow::default().is_empty());
    }

    #[tokio::test]
    async fn test_connect_fails_without_a_server() {
        let config = DatabaseConfig {
            target: ConnectionTarget::Components {
                host: "127.0.0.1".to_string(),
                port: 1,
                database: "wordsdb".to_string(),
                username: "postgres".to_string(),
                password: None,
            },
            ssl_mode: "disable".to_string(),
            max_connections: 1,
            connection_timeout: Duration::from_secs(2),
        };

        assert!(Database::connect(config).await.is_err());
    }
}
