use std::sync::Arc;

use rides::config::Config;
use rides::db::SqliteStore;
use rides::engine::Engine;
use rides::error::Error;
use rides::server::serve;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = SqliteStore::new(&config.database_url, config.max_connections).await?;
    let engine = Engine::new(Arc::new(store));

    serve(engine, config.addr()).await
}
