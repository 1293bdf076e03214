//! HTTP JSON surface over one shared [`AppState`](crate::session::state::AppState).

pub mod config;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use routes::router;

use crate::foundation::error::GifBeatResult;

/// Bind `cfg.listen_addr` and serve until Ctrl-C.
pub async fn run_server(cfg: ServerConfig) -> GifBeatResult<()> {
    let app = router(&cfg);
    let listener = tokio::net::TcpListener::bind(cfg.listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
