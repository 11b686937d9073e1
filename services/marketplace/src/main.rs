use anyhow::Context as _;
use sea_orm::{ConnectOptions, Database};
use tracing::info;

use commun_core::tracing::init_tracing;
use commun_marketplace::config::MarketplaceConfig;
use commun_marketplace::infra::blob::ObjectBlobStore;
use commun_marketplace::router::build_router;
use commun_marketplace::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,sqlx=warn,tower_http=info");

    let config = MarketplaceConfig::from_env()?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("failed to connect to database")?;

    let blobs = ObjectBlobStore::from_url(&config.blob_store_url, &config.blob_public_base_url)
        .context("failed to open blob store")?;

    let state = AppState {
        db,
        blobs,
        max_upload_bytes: config.max_upload_bytes,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.marketplace_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;

    info!("marketplace service listening on {http_addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
