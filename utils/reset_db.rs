use annotation_kit::config::Config;
use annotation_kit::database::init_db;
use annotation_kit::services::storage::FileStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;

    init_db(&config.database_url, true).await?;
    FileStorage::new(config.storage_dir.clone(), config.static_url_prefix.clone())
        .clear()
        .await?;

    tracing::info!("Database and stored images reset successfully");
    Ok(())
}
