use std::sync::Arc;

use dotenvy::dotenv;
use encoder::config::settings::AppConfig;
use encoder::infrastructure::db::pool::Database;
use encoder::infrastructure::media::Mp4Fragmenter;
use encoder::infrastructure::storage::StorageService;
use encoder::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting encoder...");

    let config = AppConfig::new()?;
    let db = Database::connect(&config.database).await?;
    let storage = StorageService::new(&config.s3);
    let port = config.server_port;

    let state = AppState::new(config, db.clone(), Arc::new(storage), Arc::new(Mp4Fragmenter::default()));
    let shutdown = state.shutdown.clone();
    let tasks = state.tasks.clone();
    let app = encoder::app::create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested, cancelling running jobs");
            shutdown.cancel();
        })
        .await?;

    tasks.close();
    info!("Waiting for {} running job(s) to stop", tasks.len());
    tasks.wait().await;

    db.close().await;
    Ok(())
}
