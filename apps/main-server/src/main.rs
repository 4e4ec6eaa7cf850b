//! SkillKonnect server binary.

use std::net::SocketAddr;

use doc_store::{DocumentStore, MemoryStore, SqliteStore};
use konnect_server::{
    api::skill::seed_default_skills, config::Config, create_app, create_state, init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        sqlite = config.uses_sqlite(),
        storage_dir = %config.storage_dir.display(),
        "Starting SkillKonnect server"
    );

    match config.database_url.clone() {
        Some(url) if config.uses_sqlite() => {
            let store = SqliteStore::connect(&url).await?;
            serve(config, store).await
        }
        Some(url) => anyhow::bail!("Unsupported DATABASE_URL: {}", url),
        None => {
            tracing::warn!("DATABASE_URL not set, data will not survive a restart");
            serve(config, MemoryStore::new()).await
        }
    }
}

async fn serve<S: DocumentStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    if config.seed_skills {
        let added = seed_default_skills(&store).await?;
        tracing::info!(added, "Seeded skill catalogue");
    }

    tokio::fs::create_dir_all(&config.storage_dir).await?;

    let addr: SocketAddr = config.server_addr().parse()?;
    let state = create_state(config, store);
    let app = create_app(state);

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
