use std::sync::Arc;

use garmin_api::config::ServerConfig;
use garmin_api::{AppState, SessionManager};
use garmin_connect_client::Config;
use garmin_connect_client::http_client::ReqwestGarminConnector;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let server = ServerConfig::from_env();
    let env_filter = tracing_subscriber::EnvFilter::try_new(&server.log_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    info!(log_filter = %server.log_filter, "garmin_api: log filter");

    let metrics = PrometheusBuilder::new().install_recorder()?;

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "missing credentials; aborting startup");
            std::process::exit(1);
        }
    };
    // No login here: the first request that needs the upstream performs it.
    let connector = Arc::new(ReqwestGarminConnector::from_config(&config)?);
    let sessions = SessionManager::new(connector, config.credentials.clone());
    let app = garmin_api::router(Arc::new(AppState::new(sessions, metrics)));

    let addr = server.addr;
    info!(%addr, upstream = %config.base_url, "starting HTTP server");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let serve = axum::serve(listener, app.into_make_service());
    if let Err(e) = serve
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                error!("failed to listen for ctrl+c: {e}");
            }
        })
        .await
    {
        error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
