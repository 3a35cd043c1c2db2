use risk_viewer::{backend, router, AppState, TimelineSync, ViewerConfig};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ViewerConfig::from_env();
    info!(
        "using {:?} backend at {} (playback every {:?})",
        config.backend_shape, config.backend_url, config.playback_interval
    );

    let backend = backend::connect(&config)?;
    let sync = TimelineSync::start(backend, config.playback_interval).await;
    let app = router(AppState::new(sync.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sync.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
