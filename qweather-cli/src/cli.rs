use anyhow::{Context, ensure};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password};
use qweather_core::{
    Config, EndpointKind, LocationConfig, LocationState, client_from_config, lookup_city,
};
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::info;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "qweather", version, about = "QWeather CLI")]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add or update a location.
    Configure {
        /// Location name, e.g. "home".
        name: String,
    },

    /// Fetch every endpoint once and print the result.
    Show {
        /// Location name; the default location if absent.
        #[arg(long)]
        location: Option<String>,
    },

    /// Poll every endpoint on its own interval until interrupted.
    Watch {
        /// Location name; the default location if absent.
        #[arg(long)]
        location: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { name } => configure(&name).await,
            Command::Show { location } => show(location.as_deref()).await,
            Command::Watch { location } => watch(location.as_deref()).await,
        }
    }
}

async fn configure(name: &str) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let existing = config.locations.get(name).cloned();

    let api_key = Password::new("API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut longitude = CustomType::<f64>::new("Longitude:");
    let mut latitude = CustomType::<f64>::new("Latitude:");
    let mut grid = Confirm::new("Use grid weather (coordinate-based data)?").with_default(true);
    if let Some(existing) = &existing {
        longitude = longitude.with_default(existing.longitude);
        latitude = latitude.with_default(existing.latitude);
        grid = grid.with_default(existing.grid_weather);
    }

    let longitude = longitude.prompt().context("Failed to read longitude")?;
    let latitude = latitude.prompt().context("Failed to read latitude")?;
    ensure!((-180.0..=180.0).contains(&longitude), "Longitude must be between -180 and 180");
    ensure!((-90.0..=90.0).contains(&latitude), "Latitude must be between -90 and 90");
    let grid_weather = grid.prompt().context("Failed to read grid weather choice")?;

    let http = config.client.http_client().context("Failed to build HTTP client")?;
    let city = lookup_city(&http, &config.client, &api_key, longitude, latitude)
        .await
        .context("Failed to communicate with QWeather")?;
    info!(city = %city.name, id = %city.id, "Resolved location");

    let mut location = LocationConfig::new(api_key, longitude, latitude);
    location.location_id = Some(city.id.clone());
    location.grid_weather = grid_weather;

    config.upsert_location(name, location);
    config.save()?;

    println!("Configured location '{name}' ({}, id {})", city.name, city.id);
    Ok(())
}

async fn show(location: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (name, _) = config.location(location)?;
    let client = client_from_config(&config, Some(name))?;

    let mut state = LocationState::default();
    state.refresh_all(&client, Utc::now()).await;

    print!("{}", output::render(name, &state));
    Ok(())
}

async fn watch(location: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (name, _) = config.location(location)?;
    let client = client_from_config(&config, Some(name))?;

    // One ticker per endpoint; fetches themselves run one at a time below.
    let (tx, mut rx) = mpsc::channel(EndpointKind::all().len());
    for &kind in EndpointKind::all() {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(kind.poll_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(kind).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    info!(location = %name, "Watching; press Ctrl-C to stop");
    let mut state = LocationState::default();
    loop {
        tokio::select! {
            Some(kind) = rx.recv() => {
                state.refresh(&client, kind, Utc::now()).await;
                print!("{}", output::render_update(name, kind, &state));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
