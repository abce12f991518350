//! `chainswitch serve` command — start the HTTP query service.
//!
//! Reads TOML configuration, builds the registry and read clients, then
//! starts an Axum HTTP server with graceful shutdown support.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use tower_http::cors;

use chainswitch::config::load_config;
use chainswitch::error::Error;
use chainswitch::routes;
use chainswitch::signal::SigDown;

#[cfg(feature = "telemetry")]
use chainswitch::telemetry::Telemetry;

/// Execute the `serve` command.
///
/// # Errors
///
/// Returns an error if configuration loading, registry validation or server
/// binding fails.
///
/// # Panics
///
/// Panics if the rustls crypto provider cannot be installed.
pub async fn run(config_path: &Path) -> Result<(), Error> {
    rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
        .expect("Failed to initialize rustls crypto provider");

    dotenv().ok();

    #[cfg(feature = "telemetry")]
    let telemetry = Telemetry::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")).register();
    #[cfg(not(feature = "telemetry"))]
    chainswitch::init_console_logging("info");

    let config = load_config(config_path)?;
    let networks = Arc::new(config.networks()?);

    let http_endpoints = Router::new().merge(routes::routes().with_state(networks));
    #[cfg(feature = "telemetry")]
    let http_endpoints = http_endpoints.layer(telemetry.http_tracing());
    let http_endpoints = http_endpoints.layer(
        cors::CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(cors::Any),
    );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))
        .map_err(|e| Error::server(format!("failed to bind {addr}: {e}")))?;

    let sig_down = SigDown::try_new().map_err(|e| Error::server(e.to_string()))?;
    let shutdown = sig_down.cancellation_token();
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::server(e.to_string()))?;
    sig_down.close().await;

    tracing::info!("server stopped");
    Ok(())
}
