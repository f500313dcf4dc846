use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use geoweather_core::{
    Config, Geolocator, HistoryBackend, IpInfoGeolocator, JsonFileWeatherStorage, format_weather,
    provider_from_config, save_weather, storage_from_config,
};
use inquire::{Confirm, Password, Select};
use std::{future::Future, time::Duration};
use tracing::{debug, info};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Weather at your current location")]
pub struct Cli {
    /// Give up on a network call after this many seconds.
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Locate this machine, show the current weather and record it.
    Show {
        /// Don't write the observation to the history log.
        #[arg(long)]
        no_save: bool,
    },

    /// Interactively set the API key, coordinate rounding and history backend.
    Configure,

    /// Print past observations from the JSON history log.
    History {
        /// Only show the most recent N entries.
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let timeout = Duration::from_secs(self.timeout_secs);

        match self.command.unwrap_or(Command::Show { no_save: false }) {
            Command::Show { no_save } => show(timeout, no_save).await,
            Command::Configure => configure(),
            Command::History { limit } => history(limit),
        }
    }
}

async fn show(timeout: Duration, no_save: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let geolocator = IpInfoGeolocator::new(config.use_rounded_coords);

    let coordinates = with_timeout(timeout, "locating", geolocator.locate()).await??;
    debug!(%coordinates, "located");

    let weather =
        with_timeout(timeout, "fetching weather", provider.get_weather(coordinates)).await??;
    print!("{}", format_weather(&weather));

    if no_save {
        return Ok(());
    }

    if let Some(storage) = storage_from_config(&config)? {
        save_weather(&weather, storage.as_ref()).context("Failed to save weather to history")?;
        info!(?storage, "observation recorded");
    }

    Ok(())
}

async fn with_timeout<F: Future>(
    timeout: Duration,
    what: &str,
    fut: F,
) -> anyhow::Result<F::Output> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| anyhow!("Timed out after {}s while {what}", timeout.as_secs()))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_openweather_api_key(api_key.trim().to_string());
    }

    config.use_rounded_coords = Confirm::new("Round coordinates to one decimal place?")
        .with_default(config.use_rounded_coords)
        .prompt()
        .context("Failed to read rounding preference")?;

    let backends = HistoryBackend::all().to_vec();
    let current = backends.iter().position(|b| *b == config.history.backend).unwrap_or(0);
    config.history.backend = Select::new("History backend:", backends)
        .with_starting_cursor(current)
        .prompt()
        .context("Failed to read history backend")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn history(limit: Option<usize>) -> anyhow::Result<()> {
    let config = Config::load()?;
    if config.history.backend != HistoryBackend::Json {
        return Err(anyhow!(
            "History listing needs the json backend (configured: {}).",
            config.history.backend
        ));
    }

    let storage = JsonFileWeatherStorage::new(config.history_path()?)?;
    let records = storage.read_history()?;
    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));

    for record in records.iter().skip(skip) {
        println!("{}\n{}", record.date, record.weather);
    }

    Ok(())
}
