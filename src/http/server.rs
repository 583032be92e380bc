//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create the Axum router with the observations and health routes
//! - Extract path parameters, raw query string, and caller identity
//! - Render pipeline failures through the error taxonomy's status mapping
//! - Serve with graceful shutdown

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::CallerIdentity;
use crate::query::{QueryEngine, VersionTarget};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
}

/// HTTP server for the observation API.
pub struct HttpServer {
    router: Router,
}

#[derive(Serialize)]
struct HealthStatus {
    version: &'static str,
    status: &'static str,
}

impl HttpServer {
    /// Create a new HTTP server around the query engine.
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        let state = AppState { engine };

        let router = Router::new()
            .route(
                "/datasets/{dataset_id}/editions/{edition}/versions/{version}/observations",
                get(get_observations),
            )
            .route("/health", get(health))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving requests in tests without a listener.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "OK",
    })
}

async fn get_observations(
    State(state): State<AppState>,
    Path((dataset_id, edition, version)): Path<(String, String, String)>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let caller = CallerIdentity::from_headers(&headers);
    let target = VersionTarget {
        dataset_id,
        edition,
        version,
    };
    let raw_query = raw_query.unwrap_or_default();

    match state
        .engine
        .get_observations(&target, &raw_query, &caller)
        .await
    {
        Ok(doc) => {
            tracing::info!(
                dataset_id = %target.dataset_id,
                edition = %target.edition,
                version = %target.version,
                total_observations = doc.total_observations,
                "observations request successful"
            );
            (StatusCode::OK, Json(doc)).into_response()
        }
        Err(err) => {
            let status = err.status();
            // The true cause is logged here; 500-class responses carry only
            // the generic message.
            tracing::error!(
                dataset_id = %target.dataset_id,
                edition = %target.edition,
                version = %target.version,
                response_status = status.as_u16(),
                error = %err,
                "observations request unsuccessful"
            );
            (status, err.response_message()).into_response()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
