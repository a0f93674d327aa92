use clap::Parser;
use tracing_subscriber::EnvFilter;

use annotation_kit::config::Config;
use annotation_kit::{build_router, database, AppState};

#[derive(Parser, Debug)]
#[command(name = "annotation-kit", version, about = "Image annotation backend")]
struct Cli {
    /// Address to bind, overrides HOST
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overrides PORT
    #[arg(long)]
    port: Option<u16>,
    /// Drop and recreate the schema and stored images before serving
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("annotation_kit=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    let reset = cli.reset_db || config.reset_db_on_startup;

    let db = database::init_db(&config.database_url, reset).await?;
    let state = AppState::new(db, &config);
    if reset {
        state.storage.clear().await?;
    } else {
        state.storage.ensure_root().await?;
    }
    tracing::info!(storage = %state.storage.root().display(), "storage ready");

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
