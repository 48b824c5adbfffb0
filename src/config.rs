use std::env;
use std::time::Duration;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
}

/// Where the persistence gateway connects to.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionTarget {
    /// A full `postgres://` URL handed to the driver untouched.
    Url(String),
    /// libpq-style components assembled from the `PG*` variables.
    Components {
        host: String,
        port: u16,
        database: String,
        username: String,
        password: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: ConnectionTarget,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        if port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        let database = DatabaseConfig::from_lookup(&lookup)?;
        database.validate()?;

        Ok(Config { port, database })
    }
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = match non_empty(lookup("DATABASE_URL")) {
            Some(url) => ConnectionTarget::from_url(&url)?,
            None => ConnectionTarget::from_components(lookup)?,
        };

        let ssl_mode = lookup("DATABASE_SSL_MODE").unwrap_or_else(|| "disable".to_string());

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a valid number")?;

        let connection_timeout_secs = lookup("DATABASE_CONNECTION_TIMEOUT")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .context("DATABASE_CONNECTION_TIMEOUT must be a valid number of seconds")?;

        Ok(DatabaseConfig {
            target,
            ssl_mode,
            max_connections,
            connection_timeout: Duration::from_secs(connection_timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<()> {
        match self.ssl_mode.as_str() {
            "disable" | "prefer" | "require" => {}
            _ => anyhow::bail!("Invalid SSL mode. Must be one of: disable, prefer, require"),
        }

        if self.max_connections == 0 {
            anyhow::bail!("Max connections must be greater than 0");
        }

        if self.connection_timeout.as_secs() == 0 {
            anyhow::bail!("Connection timeout must be greater than 0");
        }

        Ok(())
    }

    /// Host and port for log lines; never includes credentials.
    pub fn describe(&self) -> String {
        match &self.target {
            ConnectionTarget::Url(_) => "DATABASE_URL".to_string(),
            ConnectionTarget::Components { host, port, database, .. } => {
                format!("{}:{}/{}", host, port, database)
            }
        }
    }
}

impl ConnectionTarget {
    pub fn from_url(url: &str) -> Result<Self> {
        if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
            anyhow::bail!("DATABASE_URL must start with 'postgresql://' or 'postgres://'");
        }

        Ok(ConnectionTarget::Url(url.to_string()))
    }

    fn from_components<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PGHOSTADDR wins over PGHOST, matching libpq.
        let host = non_empty(lookup("PGHOSTADDR")).or_else(|| non_empty(lookup("PGHOST")));
        let port = non_empty(lookup("PGPORT"));
        let database = non_empty(lookup("PGDATABASE"));
        let username = non_empty(lookup("PGUSER"));

        let (Some(host), Some(port), Some(database), Some(username)) = (host, port, database, username)
        else {
            anyhow::bail!(
                "All database environment variables (PGHOST/PGHOSTADDR, PGPORT, PGDATABASE, PGUSER) are required if DATABASE_URL is not set"
            );
        };

        let port = port
            .parse::<u16>()
            .context("PGPORT must be a valid port number")?;

        Ok(ConnectionTarget::Components {
            host,
            port,
            database,
            username,
            password: lookup("PGPASSWORD"),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://app:secret@db:5432/wordsdb"),
            ("PGHOST", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database.target,
            ConnectionTarget::Url("postgres://app:secret@db:5432/wordsdb".to_string())
        );
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "mysql://db/words")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_components_from_pg_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("PGHOST", "database"),
            ("PGPORT", "5433"),
            ("PGDATABASE", "wordsdb"),
            ("PGUSER", "postgres"),
            ("PGPASSWORD", "pw"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(
            config.database.target,
            ConnectionTarget::Components {
                host: "database".to_string(),
                port: 5433,
                database: "wordsdb".to_string(),
                username: "postgres".to_string(),
                password: Some("pw".to_string()),
            }
        );
        assert_eq!(config.database.ssl_mode, "disable");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.database.describe(), "database:5433/wordsdb");
    }

    #[test]
    fn test_hostaddr_overrides_host_and_password_is_optional() {
        let config = Config::from_lookup(lookup_from(&[
            ("PGHOST", "database"),
            ("PGHOSTADDR", "10.0.0.5"),
            ("PGPORT", "5432"),
            ("PGDATABASE", "wordsdb"),
            ("PGUSER", "postgres"),
        ]))
        .unwrap();

        match config.database.target {
            ConnectionTarget::Components { host, password, .. } => {
                assert_eq!(host, "10.0.0.5");
                assert_eq!(password, None);
            }
            other => panic!("unexpected target: {:?}", other),
        }
    }

    #[test]
    fn test_missing_components_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[
            ("PGHOST", "database"),
            ("PGPORT", "5432"),
            ("PGUSER", "postgres"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("PGDATABASE"));
    }

    #[test]
    fn test_no_connection_descriptor_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let base = [
            ("DATABASE_URL", "postgres://app@db/wordsdb"),
        ];

        let mut bad_port = base.to_vec();
        bad_port.push(("PORT", "http"));
        assert!(Config::from_lookup(lookup_from(&bad_port)).is_err());

        let mut zero_port = base.to_vec();
        zero_port.push(("PORT", "0"));
        assert!(Config::from_lookup(lookup_from(&zero_port)).is_err());

        let mut zero_pool = base.to_vec();
        zero_pool.push(("DATABASE_MAX_CONNECTIONS", "0"));
        assert!(Config::from_lookup(lookup_from(&zero_pool)).is_err());

        let mut bad_ssl = base.to_vec();
        bad_ssl.push(("DATABASE_SSL_MODE", "sometimes"));
        assert!(Config::from_lookup(lookup_from(&bad_ssl)).is_err());
    }
}
