// Database module - read-only access to the appearances table

use std::sync::Arc;
use std::time::Duration;

use color_eyre::{
    eyre::{ensure, eyre},
    Result,
};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

pub mod models;
pub use models::*;

mod appearances;

/// Connection settings assembled from the externally supplied secrets.
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// `host` or `host:port`.
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Competition every player and club lookup is filtered by.
    pub competition: String,
}

impl DbConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let options = match self.server.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| eyre!("invalid port in server address '{}': {e}", self.server))?;
                PgConnectOptions::new().host(host).port(port)
            }
            None => PgConnectOptions::new().host(&self.server),
        };

        Ok(options
            .database(&self.database)
            .username(&self.username)
            .password(&self.password))
    }
}

// Main database handle
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
    competition: Arc<str>,
}

impl Db {
    pub async fn new(config: &DbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .test_before_acquire(true)
            .connect_with(config.connect_options()?)
            .await?;

        // Verify connection
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await?;
        ensure!(one == 1, "connection check failed");

        tracing::info!(
            server = %config.server,
            database = %config.database,
            "database connection has been verified"
        );

        Ok(Self::from_pool(pool, &config.competition))
    }

    /// Builds a handle without touching the network; the first query connects.
    pub fn connect_lazy(config: &DbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(3))
            .connect_lazy_with(config.connect_options()?);
        Ok(Self::from_pool(pool, &config.competition))
    }

    pub fn from_pool(pool: PgPool, competition: &str) -> Self {
        Self {
            pool,
            competition: Arc::from(competition),
        }
    }

    pub fn competition(&self) -> &str {
        &self.competition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server: &str) -> DbConfig {
        DbConfig {
            server: server.to_string(),
            database: "football".to_string(),
            username: "reader".to_string(),
            password: "p@ss;word".to_string(),
            competition: "Champions League".to_string(),
        }
    }

    #[test]
    fn connect_options_split_host_and_port() {
        let options = config("db.example.com:6543").connect_options().unwrap();
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("football"));
        assert_eq!(options.get_username(), "reader");
    }

    #[test]
    fn connect_options_default_port_without_suffix() {
        let options = config("db.example.com").connect_options().unwrap();
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 5432);
    }

    #[test]
    fn connect_options_reject_bad_port() {
        assert!(config("db.example.com:http").connect_options().is_err());
    }
}
