use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use weather_core::{
    Config, FavoritesStore, FetchState, GeoLocator, QueryError, Units, config::API_KEY_ENV,
};

use crate::{render, session::Session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name.
    pub city: String,

    /// Optional country code or name, e.g. "FR".
    #[arg(long, short)]
    pub country: Option<String>,

    /// "metric" or "imperial"; defaults to the configured units.
    #[arg(long, short, value_parser = parse_units)]
    pub units: Option<Units>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Play the weather animation for a few seconds afterwards.
        #[arg(long)]
        animate: bool,

        /// Write the condition icon (PNG) to this path.
        #[arg(long)]
        icon: Option<PathBuf>,
    },

    /// Show the 5-day forecast for a city.
    Forecast {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Guess city and country from your public IP address.
    Locate,

    /// Manage saved cities.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Start an interactive session.
    Interactive,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List saved cities.
    List,
    /// Save a city.
    Add { city: String },
    /// Forget a city.
    Remove { city: String },
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}

/// Trimmed favorite label; an empty one is rejected like an empty search.
fn favorite_label(city: &str) -> Result<&str, QueryError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(QueryError::MissingCity);
    }
    Ok(city)
}

const ANIMATION_LENGTH: Duration = Duration::from_secs(3);

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => {
                let mut cfg = Config::load_from(path)?;
                cfg.apply_env_key(std::env::var(API_KEY_ENV).ok());
                Ok(cfg)
            }
            None => Config::load(),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;

        match self.command {
            Command::Show {
                location,
                animate,
                icon,
            } => {
                let mut session = Session::from_config(&config)?;
                session.fill_form(&location, config.units);
                session.search().await?;
                println!("{}", render::page(session.state()));

                let FetchState::Rendered(weather) = session.state().current() else {
                    bail!("no weather to show");
                };

                if let Some(path) = icon {
                    match &weather.icon {
                        Some(image) => tokio::fs::write(&path, &image.png)
                            .await
                            .with_context(|| format!("Failed to write icon: {}", path.display()))?,
                        None => eprintln!("Icon unavailable for '{}'", weather.icon_id),
                    }
                }

                if animate {
                    render::play_animation(weather.animation_mode, ANIMATION_LENGTH).await;
                }
            }
            Command::Forecast { location } => {
                let mut session = Session::from_config(&config)?;
                session.fill_form(&location, config.units);
                session.forecast().await?;
                println!("{}", render::page(session.state()));

                if let FetchState::Errored(_) = session.state().forecast() {
                    bail!("forecast unavailable");
                }
            }
            Command::Locate => {
                let location = GeoLocator::new(&config.geolocation_url)
                    .locate()
                    .await
                    .context("Location Error")?;
                println!("City:    {}", location.city);
                println!("Country: {}", location.country);
            }
            Command::Favorites { action } => {
                let mut favorites = FavoritesStore::load(&config.favorites_path)?;
                match action {
                    FavoritesAction::List => {}
                    FavoritesAction::Add { city } => {
                        let city = favorite_label(&city)?;
                        if !favorites.add(city)? {
                            println!("'{city}' is already in favorites.");
                        }
                    }
                    FavoritesAction::Remove { city } => {
                        if !favorites.remove(&city)? {
                            println!("'{city}' is not in favorites.");
                        }
                    }
                }
                println!("{}", render::favorites(&favorites));
            }
            Command::Interactive => {
                let session = Session::from_config(&config)?;
                session.interact().await?;
            }
        }

        Ok(())
    }
}
