//! HTTP server configuration read from the environment.

use std::env;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: String,
    pub(crate) pool_max_size: u32,
}

impl ServerConfig {
    /// Read `BIND_ADDR`, `DATABASE_URL`, and `DB_POOL_MAX_SIZE`.
    ///
    /// `BIND_ADDR` defaults to `0.0.0.0:8080`; the pool size defaults to 10.
    /// `DATABASE_URL` is required.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when `DATABASE_URL` is missing or another
    /// variable fails to parse.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = match env::var("BIND_ADDR") {
            Ok(value) => value
                .parse()
                .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| std::io::Error::other("DATABASE_URL is not set"))?;

        let pool_max_size = match env::var("DB_POOL_MAX_SIZE") {
            Ok(value) => value
                .parse()
                .map_err(|err| std::io::Error::other(format!("invalid DB_POOL_MAX_SIZE: {err}")))?,
            Err(_) => 10,
        };

        Ok(Self {
            bind_addr,
            database_url,
            pool_max_size,
        })
    }

    /// Construct a configuration directly, bypassing the environment.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, database_url: impl Into<String>) -> Self {
        Self {
            bind_addr,
            database_url: database_url.into(),
            pool_max_size: 10,
        }
    }

    /// Override the connection pool size.
    #[must_use]
    pub fn with_pool_max_size(mut self, pool_max_size: u32) -> Self {
        self.pool_max_size = pool_max_size;
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// The PostgreSQL connection string.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn builder_overrides_apply() {
        let config = ServerConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 9000)),
            "postgres://localhost/recipes",
        )
        .with_pool_max_size(4);

        assert_eq!(config.bind_addr().port(), 9000);
        assert_eq!(config.database_url(), "postgres://localhost/recipes");
        assert_eq!(config.pool_max_size, 4);
    }
}
