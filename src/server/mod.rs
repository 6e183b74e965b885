//! HTTP API over the aggregator.
//!
//! Every route is a read-only `GET` taking `state` and/or `city` query
//! parameters. The aggregator is shared by `Arc`; handlers never mutate it.

mod error;
mod routes;

pub use error::ApiError;

use crate::analyzers::aggregate::Aggregator;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The complete application: routes, shared state and middleware.
pub fn app(aggregator: Arc<Aggregator>) -> Router {
    routes::routes()
        .with_state(aggregator)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `0.0.0.0:port` and serves until the process is stopped.
pub async fn serve(aggregator: Arc<Aggregator>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app(aggregator)).await?;
    Ok(())
}
