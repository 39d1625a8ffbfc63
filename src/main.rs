use tracing_subscriber::EnvFilter;

use fumigo::api::server::start_server;
use fumigo::api::types::ApiContext;
use fumigo::config::Config;
use fumigo::db::open_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FUMIGO_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(config.media_dir())?;

    // Open once at startup so migrations run before the first request.
    open_database(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), "Database ready");

    let ctx = ApiContext::new(&config);
    let mut server = start_server(ctx, config.bind_addr).await?;
    tracing::info!(
        version = fumigo::config::APP_VERSION,
        addr = %server.addr,
        "{} listening", fumigo::config::APP_NAME
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    server.shutdown();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    Ok(())
}
