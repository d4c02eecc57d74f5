use budget_tracker::{
    api::{self, AppState},
    config::{database, settings},
    errors::Result,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings (config.toml plus env overrides)
    let settings = settings::load_app_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and make sure the tables exist
    let url = database::get_database_url(settings.database.url.as_deref());
    let db = database::create_connection(&url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Serve the API until Ctrl+C
    let listen_addr = settings.server.listen_addr.clone();
    let state = Arc::new(AppState { db, settings });
    api::serve(state, &listen_addr).await?;

    info!("Server stopped.");
    Ok(())
}
