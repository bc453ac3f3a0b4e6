//! HTTP client for the trends backend.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::error::WeatherError;
use crate::types::{BackendReply, ForecastPayload, WeatherSnapshot};

const USER_AGENT: &str = concat!("trendcast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: Url,
}

impl WeatherClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, WeatherError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| WeatherError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(WeatherError::InvalidBaseUrl(base_url.to_string()));
        }
        // Url::join replaces the last path segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current weather snapshot for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(
        &self,
        city: &str,
    ) -> Result<BackendReply<WeatherSnapshot>, WeatherError> {
        self.get("weather", city).await
    }

    /// Trend charts for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(
        &self,
        city: &str,
    ) -> Result<BackendReply<ForecastPayload>, WeatherError> {
        self.get("forecast", city).await
    }

    fn endpoint(&self, name: &str, city: &str) -> Result<Url, WeatherError> {
        let mut url = self
            .base_url
            .join(name)
            .map_err(|e| WeatherError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("city", city);
        Ok(url)
    }

    /// The backend puts `{error}` bodies on 4xx/5xx replies, so the body is
    /// read whatever the status.
    async fn get<T: DeserializeOwned>(
        &self,
        name: &str,
        city: &str,
    ) -> Result<BackendReply<T>, WeatherError> {
        let url = self.endpoint(name, city)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} returned status {}", name, status);
        }

        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| WeatherError::Parse(format!("{} body is not JSON: {}", name, e)))?;

        BackendReply::from_value(value)
            .map_err(|e| WeatherError::Parse(format!("unexpected {} body: {}", name, e)))
    }
}
