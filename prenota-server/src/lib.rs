use std::net::{Ipv6Addr, SocketAddr};

use axum::{
    http::{
        header::{CACHE_CONTROL, PRAGMA},
        HeaderValue,
    },
    routing::get,
};
use log::info;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

mod auth;
mod bookings;
mod config;
mod context;
mod docs;
mod errors;
mod schemas;
mod serialized;
mod settings;

#[cfg(test)]
mod tests;

pub use config::*;
pub use context::*;
pub use errors::*;

pub type Router = axum::Router<ServerContext>;

/// Builds every route of the server around the given context.
pub fn router(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_router = Router::new()
        .merge(auth::router())
        .merge(bookings::admin_router())
        .merge(settings::admin_router());

    let api_router = Router::new()
        .merge(bookings::router())
        .merge(settings::router())
        .nest("/admin", admin_router);

    Router::new()
        .nest("/api", api_router)
        .route("/api.json", get(docs::docs))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(cors)
        .with_state(context)
}

/// Starts the prenota server
pub async fn run_server(config: ServerConfig) -> Result<(), std::io::Error> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, config.port).into();
    let context = ServerContext::new(config);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(context).into_make_service()).await
}
