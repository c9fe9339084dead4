use anyhow::anyhow;
use axum::serve;
use predictor::setup_logger;
use slog::{error, info, Logger};
use std::{net::SocketAddr, str::FromStr};
use tokio::{net::TcpListener, signal};
use web::{app, build_app_state, get_config_info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cli, source) = get_config_info();
    let logger = setup_logger(cli.level.as_deref());
    let settings = cli.context_settings();

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", cli.host(), cli.port()))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .await
        .map_err(|e| anyhow!("error binding to socket: {}", e))?;

    info!(logger, "Flight delay web form starting...");
    info!(logger, "  Listen: http://{}", socket_addr);
    info!(logger, "  Config: {}", source);
    info!(logger, "  Routes: {}", settings.routes_file.display());
    info!(logger, "  Model: {}", settings.model_file.display());
    info!(logger, "  Weather service: {}", settings.weather_url);

    let app_state = build_app_state(&settings, logger.clone()).map_err(|e| {
        error!(logger, "error building app: {}", e);
        e
    })?;

    serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await?;

    info!(logger, "Flight delay web form stopped");
    Ok(())
}

async fn shutdown_signal(logger: Logger) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(logger, "failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(logger, "failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(logger, "shutdown signal received");
}
