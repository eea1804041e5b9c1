//! Server construction: pool, migrations, state, and the actix listener.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DbPool, DieselFavoriteRepository, DieselFollowRepository, DieselIngredientRepository,
    DieselRecipeRepository, DieselShoppingCartRepository, DieselTagRepository,
    DieselTokenRepository, DieselUserRepository, PoolConfig,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending SQL migrations over a blocking connection.
///
/// diesel-async has no migration harness, so this runs before the pool is
/// built, on a plain synchronous connection.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the connection or a migration fails.
pub fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    info!(count = applied.len(), "migrations applied");
    Ok(())
}

/// Wire every repository adapter over the shared pool.
fn build_http_state(pool: &DbPool) -> HttpState {
    HttpState {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tokens: Arc::new(DieselTokenRepository::new(pool.clone())),
        tags: Arc::new(DieselTagRepository::new(pool.clone())),
        ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
        recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        favorites: Arc::new(DieselFavoriteRepository::new(pool.clone())),
        cart: Arc::new(DieselShoppingCartRepository::new(pool.clone())),
        follows: Arc::new(DieselFollowRepository::new(pool.clone())),
    }
}

/// Construct the actix HTTP server over a database-backed state.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the pool cannot be built or the
/// socket cannot be bound.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(|err| std::io::Error::other(err.to_string()))?;

    let state = web::Data::new(build_http_state(&pool));
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(Trace)
            .configure(http::configure);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "server listening");
    Ok(server)
}
