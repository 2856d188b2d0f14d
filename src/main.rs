use dotenvy::dotenv;
use restaurant_directory::{
    api::{AppState, build_app},
    config::{database, settings},
    core::cuisine,
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Tracing first so config loading is logged
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. .env is optional, variables may come from the environment
    dotenv().ok();

    // 3. Settings file plus DATABASE_URL override
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Database and schema
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))?;

    // 5. Cuisines listed in config.toml
    let seeded = cuisine::seed_cuisines(&db, &app_config.cuisines)
        .await
        .inspect_err(|e| error!("Failed to seed cuisines: {}", e))?;
    if seeded > 0 {
        info!("Seeded {} cuisines.", seeded);
    }

    // 6. Serve until Ctrl+C
    let bind_address = app_config.server.bind_address.clone();
    let app = build_app(AppState::new(db, app_config));
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
