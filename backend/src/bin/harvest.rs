//! One harvest cycle: fetch every province, persist new readings, exit.
//!
//! Meant to be run by an external scheduler (cron, systemd timer).

use anyhow::{bail, Context};
use clap::Parser;
use shared::LocationRegistry;
use weather_backend::{
    external::TmdForecastClient,
    init_tracing,
    services::{CycleSummary, HarvestService, MinIntervalGate},
    store::{MemoryStore, PgWeatherStore, WeatherStore},
    Config, LogFormat,
};

#[derive(Debug, Parser)]
#[command(name = "weather-harvest", about = "Fetch hourly forecasts for every Thai province")]
struct Args {
    /// Keep readings in memory and print the summary instead of writing to PostgreSQL
    #[arg(long)]
    dry_run: bool,

    /// Exit with an error when any province was skipped
    #[arg(long, env = "WEATHER_HARVEST_STRICT")]
    strict: bool,

    /// Log line format
    #[arg(long, value_enum, env = "WEATHER_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing("weather_harvest=info,weather_backend=info,sqlx=warn", args.log_format);

    let config = Config::load().context("failed to load configuration")?;
    if config.forecast_api.token.trim().is_empty() {
        bail!("forecast_api.token must be set (WEATHER_FORECAST_API__TOKEN)");
    }

    let client = TmdForecastClient::new(&config.forecast_api)
        .context("failed to build forecast API client")?;
    let gate = MinIntervalGate::new(config.harvest.min_interval());
    tracing::info!(
        interval_ms = gate.interval().as_millis() as u64,
        concurrency = config.harvest.max_concurrency,
        "Forecast API throttle configured"
    );
    let service = HarvestService::new(client, gate, LocationRegistry::thailand())
        .with_concurrency(config.harvest.max_concurrency);

    let summary = if args.dry_run {
        tracing::info!("Dry run: readings stay in memory");
        let store = MemoryStore::new();
        run(&service, &store).await?
    } else {
        let store = PgWeatherStore::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        if config.database.run_migrations {
            store.migrate().await.context("failed to run migrations")?;
        }
        let result = run(&service, &store).await;
        store.close().await;
        result?
    };

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if args.strict && summary.report.is_degraded() {
        bail!(
            "{} of {} provinces were skipped",
            summary.report.skipped.len(),
            service.registry().len()
        );
    }
    Ok(())
}

async fn run(
    service: &HarvestService<TmdForecastClient, MinIntervalGate>,
    store: &dyn WeatherStore,
) -> anyhow::Result<CycleSummary> {
    let summary = service.run_and_persist(store).await?;
    tracing::info!(
        accepted = summary.report.accepted.len(),
        skipped = summary.report.skipped.len(),
        inserted = summary.write.inserted,
        duplicates = summary.write.duplicates,
        "Harvest complete"
    );
    Ok(summary)
}
