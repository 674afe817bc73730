mod api;

use std::{env, net::SocketAddr, path::Path};

use axum::{Json, Router, routing::get};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir};
use tracing::{info, warn};
use vizrelay_core::{Config, TableauClient, init_telemetry};

#[derive(Clone)]
struct AppState {
    tableau: TableauClient,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    let guard = init_telemetry(&config.app, &config.telemetry)?;
    if guard.exporting() {
        info!("exporting traces over OTLP");
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("vizrelay/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let tableau = TableauClient::new(http).with_api_version(config.tableau.api_version.clone());
    info!(api_version = tableau.api_version(), "using Tableau REST API");

    let app = router(AppState { tableau }, &config.paths.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("vizrelay listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api::router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(api::error::panic_response))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("received ctrl+c, shutting down");
        }
        _ = terminate => {
            warn!("received terminate signal, shutting down");
        }
    }
}
