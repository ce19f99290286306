//! Thai weather read API server

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use weather_backend::{
    create_app, init_tracing, store::PgWeatherStore, AppState, Config, LogFormat,
};

#[derive(Debug, Parser)]
#[command(name = "weather-server", about = "Serve stored hourly forecasts over HTTP")]
struct Args {
    /// Log line format
    #[arg(long, value_enum, env = "WEATHER_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(
        "weather_server=debug,weather_backend=debug,tower_http=debug,sqlx=warn",
        args.log_format,
    );

    let config = Config::load()?;

    tracing::info!("Starting Thai Weather read API");
    tracing::info!("Environment: {}", config.environment);

    tracing::info!("Connecting to database...");
    let store = PgWeatherStore::connect(&config.database).await?;
    tracing::info!("Database connection established");

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        store.migrate().await?;
        tracing::info!("Migrations completed");
    }

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState::new(Arc::new(store.clone()), &config.query);
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
