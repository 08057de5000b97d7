use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::PodcastConfig;
use crate::podcast::PodcastService;

/// Request bodies only ever carry a coordinate
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Extra time the outer layer allows so the API deadline answers first
const TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// API routes plus the frontend, with unknown paths served `index.html`
pub fn app(service: Arc<PodcastService>, static_dir: &str, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = Path::new(static_dir).join("index.html");

    Router::new()
        .nest("/api", api::router(service, request_timeout))
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout + TIMEOUT_GRACE,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: &PodcastConfig, service: Arc<PodcastService>) -> Result<()> {
    let app = app(service, &config.server.static_dir, config.request_timeout());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    match (&config.server.tls_cert_path, &config.server.tls_key_path) {
        #[cfg(feature = "tls")]
        (Some(cert), Some(key)) => serve_tls(app, addr, cert, key).await,
        #[cfg(not(feature = "tls"))]
        (Some(_), Some(_)) => {
            tracing::warn!(
                "TLS paths configured but built without the tls feature, serving plain HTTP"
            );
            serve_plain(app, addr).await
        }
        _ => serve_plain(app, addr).await,
    }
}

async fn serve_plain(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", addr.port());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

#[cfg(feature = "tls")]
async fn serve_tls(app: Router, addr: SocketAddr, cert: &str, key: &str) -> Result<()> {
    // reqwest links its own crypto provider, so the server's must be chosen explicitly
    let _ = rustls::crypto::ring::default_provider().install_default();

    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {cert} / key {key}"))?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    tracing::info!("Web server running at https://localhost:{}", addr.port());
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
