use std::{path::PathBuf, process::ExitCode, time::Duration};

use aperol_core::{
    Config, Coordinates, DrinkScorePolicy, DrinkStyle, EffectToggle, GeolocationMode,
    NominatimClient, Page, Pipeline, RenderOptions, location_from_config, provider_from_config,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select};
use tracing::info;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aperol", version, about = "Local weather, with an Aperol chance forecast")]
pub struct Cli {
    /// Read and write this config file instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Locate yourself and show current weather and the forecast.
    Show {
        /// Latitude in decimal degrees; skips geolocation.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees; skips geolocation.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Drink score policy: "temperature" or "weather_code".
        #[arg(long, value_parser = parse_policy)]
        policy: Option<DrinkScorePolicy>,

        /// Show the drink score as glasses instead of a number.
        #[arg(long)]
        glyphs: bool,

        /// Don't request or show the hourly strip.
        #[arg(long)]
        no_hourly: bool,

        /// Don't request or show UV readings.
        #[arg(long)]
        no_uv: bool,

        /// Print the rendered page as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactively edit the saved configuration.
    Configure,

    /// Cycle the background colour for a while, then restore it.
    Trippy {
        /// How long to keep the effect on.
        #[arg(long, default_value_t = 5)]
        seconds: u64,
    },
}

fn parse_policy(value: &str) -> Result<DrinkScorePolicy, String> {
    DrinkScorePolicy::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = self.load_config()?;

        match self.command {
            Command::Show { lat, lon, policy, glyphs, no_hourly, no_uv, json } => {
                if let Some(policy) = policy {
                    config.drink_score = policy;
                }
                if glyphs {
                    config.drink_style = DrinkStyle::Glyphs;
                }
                config.hourly &= !no_hourly;
                config.uv &= !no_uv;

                let coords = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                    _ => None,
                };

                show(&config, coords, json).await
            }
            Command::Configure => {
                configure(&mut config)?;
                let path = match &self.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("Saved configuration to {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
            Command::Trippy { seconds } => {
                trippy(Duration::from_secs(seconds)).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(config: &Config, coords: Option<Coordinates>, json: bool) -> anyhow::Result<ExitCode> {
    let geo = location_from_config(config, coords)?;
    let places = NominatimClient::new(config.endpoints.geocode_url.clone(), config.language.clone())?;
    let weather = provider_from_config(config);

    let pipeline = Pipeline::new(geo, Box::new(places), weather, RenderOptions::from_config(config));

    let mut page = Page::default();
    let report = pipeline.run(&mut page).await;
    info!(stage = %report.final_stage(), "pipeline finished");

    if json {
        let body = serde_json::to_string_pretty(&page).context("Failed to serialize page")?;
        println!("{body}");
    } else {
        output::print_page(&page);
    }

    Ok(if report.succeeded() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let policies = DrinkScorePolicy::all().to_vec();
    let start = policies.iter().position(|p| *p == config.drink_score).unwrap_or(0);
    config.drink_score = Select::new("Base the Aperol chance on:", policies)
        .with_starting_cursor(start)
        .prompt()?;

    let glyphs = Confirm::new("Show the score as glasses instead of a number?")
        .with_default(config.drink_style == DrinkStyle::Glyphs)
        .prompt()?;
    config.drink_style = if glyphs { DrinkStyle::Glyphs } else { DrinkStyle::Number };

    config.hourly = Confirm::new("Show the hourly strip?").with_default(config.hourly).prompt()?;
    config.uv = Confirm::new("Show UV readings?").with_default(config.uv).prompt()?;

    let pin = Confirm::new("Pin a fixed location instead of looking it up?")
        .with_default(config.location.is_some())
        .prompt()?;

    if pin {
        let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
        Coordinates::new(latitude, longitude)?;
        config.set_location(latitude, longitude);
    } else {
        config.clear_location();
        let lookup = Confirm::new("Look up your location from your IP address?")
            .with_default(config.geolocation == GeolocationMode::Ip)
            .prompt()?;
        config.geolocation = if lookup { GeolocationMode::Ip } else { GeolocationMode::Off };
    }

    Ok(())
}

async fn trippy(duration: Duration) -> anyhow::Result<()> {
    let mut toggle = EffectToggle::new();
    let mut rx = toggle.subscribe();

    toggle.toggle().await;
    println!("[{}]", toggle.label());

    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let decoration = rx.borrow_and_update().clone();
                output::print_decoration(&decoration)?;
            }
        }
    }

    toggle.toggle().await;
    output::print_decoration(&toggle.decoration())?;
    println!();
    println!("[{}]", toggle.label());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["aperol", "show", "--lat", "-33.87", "--lon", "151.21"])
            .expect("should parse");
        match cli.command {
            Command::Show { lat, lon, .. } => {
                assert_eq!(lat, Some(-33.87));
                assert_eq!(lon, Some(151.21));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["aperol", "show", "--lat", "52.5"]).is_err());
    }

    #[test]
    fn policy_flag_parses() {
        let cli = Cli::try_parse_from(["aperol", "show", "--policy", "weather_code", "--glyphs"])
            .expect("should parse");
        match cli.command {
            Command::Show { policy, glyphs, .. } => {
                assert_eq!(policy, Some(DrinkScorePolicy::WeatherCode));
                assert!(glyphs);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = Cli::try_parse_from(["aperol", "show", "--policy", "vibes"]).unwrap_err();
        assert!(err.to_string().contains("Unknown drink score policy"));
    }

    #[test]
    fn trippy_defaults_to_five_seconds() {
        let cli = Cli::try_parse_from(["aperol", "trippy"]).expect("should parse");
        assert!(matches!(cli.command, Command::Trippy { seconds: 5 }));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["aperol", "show", "--config", "/tmp/aperol.toml"])
            .expect("should parse");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/aperol.toml")));
    }
}
