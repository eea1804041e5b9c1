//! Recipe-sharing backend.
//!
//! Hexagonal layout: `domain` holds entities, validation, and port traits;
//! `inbound::http` adapts actix-web requests onto the ports; and
//! `outbound::persistence` implements the ports over PostgreSQL via Diesel.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
