use endpoint_catalogue::config::{AppConfig, StorageBackend};
use endpoint_catalogue::logic::SharingResolver;
use endpoint_catalogue::seed;
use endpoint_catalogue::store::{InMemoryStore, PostgresStore, Store};
use log::info;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    info!(
        "Configuration loaded: server={} backend={:?}",
        config.server_address(),
        config.storage.backend
    );

    match config.storage.backend {
        StorageBackend::Memory => run(InMemoryStore::new(), &config).await,
        StorageBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let store =
                PostgresStore::new(&config.database_url()?, config.max_connections()).await?;
            store.migrate().await?;
            info!("Database migrations applied");
            run(store, &config).await
        }
    }
}

async fn run<S: Store + 'static>(store: S, config: &AppConfig) -> anyhow::Result<()> {
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        info!("Loading seed data...");
        seed::load_seed_data(&store, &SharingResolver::new(config.name_policy())).await?;
    }

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Endpoint catalogue running on http://{}", bind_address);

    endpoint_catalogue::serve_with_store(store, config, listener).await
}
