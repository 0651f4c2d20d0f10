//! Approximate location lookup by public IP, used to prefill the search form.

use std::time::Duration;

use reqwest::Client;

use crate::{error::FetchError, model::GeoLocation};

pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipinfo.io/json";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone)]
pub struct GeoLocator {
    url: String,
    http: Client,
}

impl GeoLocator {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            http: Client::new(),
        }
    }

    /// Resolve the caller's city and country. Missing fields come back empty.
    pub async fn locate(&self) -> Result<GeoLocation, FetchError> {
        let res = self
            .http
            .get(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Provider(format!(
                "Location lookup failed with status {status}"
            )));
        }

        let body = res.text().await?;
        let location: GeoLocation = serde_json::from_str(&body)?;
        tracing::info!(city = %location.city, country = %location.country, "location resolved");

        Ok(location)
    }
}

impl Default for GeoLocator {
    fn default() -> Self {
        Self::new(DEFAULT_GEOLOCATION_URL)
    }
}
