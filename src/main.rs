use yomitori::api::{api_router, ApiContext};
use yomitori::config::AppConfig;
use yomitori::db::open_database;
use yomitori::storage::LocalObjectStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    yomitori::init_tracing();

    let config = AppConfig::from_env();
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(config.blobs_dir())?;

    let conn = open_database(&config.database_path())?;
    let store = LocalObjectStore::new(config.blobs_dir());

    let bind_addr = config.bind_addr.clone();
    let ctx = ApiContext::new(config, conn, store);
    let app = api_router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Yomitori listening");
    axum::serve(listener, app).await?;
    Ok(())
}
