use crate::{
    Config, LocationQuery,
    model::{CurrentWeatherResult, ForecastResult},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current conditions and daily forecasts.
///
/// Implementations never panic or return transport errors out of band: every
/// outcome, including timeouts, is folded into the returned result so the
/// value can be handed to the UI loop as-is.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, query: &LocationQuery) -> CurrentWeatherResult;

    async fn fetch_forecast(&self, query: &LocationQuery) -> ForecastResult;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let client = OpenWeatherClient::from_config(config)?;
    Ok(Arc::new(client))
}
