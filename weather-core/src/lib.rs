//! Core library for the `weather` client.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client and IP geolocation
//! - Forecast aggregation (one midday reading per day)
//! - Background fetches with results handed back to a single UI loop
//! - Application state, favorites persistence and search history
//! - Animation stepping for the decorative backdrop
//!
//! It is used by `weather-cli`, but knows nothing about how results are drawn.

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod favorites;
pub mod forecast;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod provider;
pub mod runner;

pub use app::{AppState, Controller, DailyForecast, FetchState, Page, Theme};
pub use config::Config;
pub use error::{ErrorKind, FavoritesError, FetchError, QueryError};
pub use favorites::FavoritesStore;
pub use forecast::reduce_to_daily;
pub use geolocation::GeoLocator;
pub use history::SearchHistory;
pub use model::{
    AnimationMode, CurrentWeather, CurrentWeatherResult, ForecastDay, ForecastResult,
    LocationQuery, Units,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use runner::{UiHandle, UiLoop, ui_loop};
