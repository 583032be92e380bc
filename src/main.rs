//! Observation API service binary.
//!
//! Startup order: tracing first, then config, then upstream clients, then
//! the HTTP server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use observation_api::clients::{DatasetApiClient, GraphStoreClient};
use observation_api::config::loader;
use observation_api::http::HttpServer;
use observation_api::query::QueryEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "observation_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "observation-api starting");

    let config = Arc::new(loader::load_from_env()?);

    tracing::info!(
        bind_address = %config.bind_address,
        dataset_api_url = %config.dataset_api_url,
        graph_api_url = %config.graph_api_url,
        enable_private_endpoints = config.enable_private_endpoints,
        default_observation_limit = config.default_observation_limit,
        "configuration loaded"
    );

    let dataset_client = Arc::new(DatasetApiClient::new(
        config.dataset_api_url.clone(),
        config.service_auth_token.clone(),
    ));
    let store = Arc::new(GraphStoreClient::new(config.graph_api_url.clone()));

    let engine = Arc::new(QueryEngine::new(Arc::clone(&config), dataset_client, store));

    let listener = TcpListener::bind(&config.bind_address).await?;
    HttpServer::new(engine).run(listener).await?;

    Ok(())
}
