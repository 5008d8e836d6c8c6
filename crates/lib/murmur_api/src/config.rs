//! API server configuration.

use std::time::Duration;

use murmur_core::store::StoreKind;

/// Default listener address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3100";

/// Default PostgreSQL connection URL.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/murmur";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// Which document store backend to use.
    pub store: StoreKind,
    /// PostgreSQL connection URL. Ignored by the memory store.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection.
    pub acquire_timeout: Duration,
}

impl Default for ApiConfig {
    /// Local development defaults.
    ///
    /// | Field             | Default                             |
    /// |-------------------|-------------------------------------|
    /// | `bind_addr`       | `127.0.0.1:3100`                    |
    /// | `store`           | `postgres`                          |
    /// | `database_url`    | `postgres://localhost:5432/murmur`  |
    /// | `max_connections` | `5`                                 |
    /// | `acquire_timeout` | 30 seconds                          |
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            store: StoreKind::Postgres,
            database_url: DEFAULT_DATABASE_URL.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}
