// --- Schedule assembly engine - entry point ---

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scarletshift::catalog::{Catalog, CatalogHandle};
use scarletshift::config::Config;
use scarletshift::run_server;
use scarletshift::session::MemorySessionStore;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let catalog = CatalogHandle::empty();
    match Catalog::load_from_path(&config.catalog_path) {
        Ok(loaded) => {
            info!(courses = loaded.len(), path = %config.catalog_path, "catalog loaded");
            catalog.replace(loaded);
        }
        // the process still starts; requests report a retryable condition
        // until a refresh succeeds
        Err(e) => warn!("catalog unavailable at startup: {e}"),
    }

    info!("starting scheduling API on http://{}", config.bind_addr);
    run_server(config, catalog, Arc::new(MemorySessionStore::new())).await
}
