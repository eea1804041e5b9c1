//! Backend entry-point: tracing, migrations, pool, and the HTTP listener.

use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::server::{create_server, run_migrations, ServerConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env()?;
    run_migrations(config.database_url())?;

    create_server(config).await?.await
}
