use tvm_server::{build_router, logger, startup};

use std::error::Error;

use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config = tvm_config::Config::load()?;
    config.validate()?;
    let config_dir = tvm_config::Config::config_dir()?;

    // Construct log file path if configured
    let log_file_path = match config.logging.file {
        Some(ref filename) => {
            let log_dir = config_dir.join(&config.logging.dir);
            std::fs::create_dir_all(&log_dir)?;
            Some(log_dir.join(filename))
        }
        None => None,
    };

    // Initialize logger (before any other logging)
    logger::initialize(*config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting tvm-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let sdk_config = tvm_vending::load_sdk_config(&config.vending).await;

    let state = startup::build_app_state(&config, &config_dir, sdk_config).await?;
    let app = build_router(state, &config.server);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received SIGINT (Ctrl+C), shutting down"),
                Err(e) => error!("Failed to listen for SIGINT: {e}"),
            }
        })
        .await?;

    info!("Graceful shutdown complete");
    Ok(())
}
