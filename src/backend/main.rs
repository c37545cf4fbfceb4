/**
 * cmshub Server Entry Point
 *
 * Loads configuration, starts the hub and serves the Axum application until
 * Ctrl-C (or SIGTERM on Unix), then stops the broadcast worker.
 */

use cmshub::backend::server::init::create_app;
use cmshub::backend::server::shutdown_signal;
use cmshub::shared::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cmshub=debug".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("Server initialization started");

    let config = AppConfig::load()?;
    let app = create_app(&config).await?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    let shutdown = app.shutdown.clone();
    axum::serve(listener, app.router.clone())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    app.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}
