//! OpenWeatherMap current-conditions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use codehud_core::WeatherReport;

use crate::{FeedError, WeatherSource};

#[derive(Debug, Deserialize)]
struct Observation {
    #[serde(default)]
    weather: Vec<Condition>,
    main: Readings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Queries `/data/2.5/weather` for one configured place, in Fahrenheit.
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    location: String,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("location", &self.location)
            .finish()
    }
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, location: &str) -> Self {
        Self::with_client(Client::new(), base_url, api_key, location)
    }

    pub fn with_client(http: Client, base_url: &str, api_key: &str, location: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            location: location.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn request_url(&self) -> Result<Url, FeedError> {
        let url = Url::parse_with_params(
            &format!("{}/data/2.5/weather", self.base_url),
            &[
                ("q", self.location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "imperial"),
            ],
        )?;
        Ok(url)
    }
}

/// Parse a successful `/weather` body.
pub fn parse_observation(location: &str, body: &str) -> Result<WeatherReport, FeedError> {
    let obs: Observation = serde_json::from_str(body)?;
    let condition = obs
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| FeedError::Parse("no weather conditions in response".into()))?;

    Ok(WeatherReport {
        location: location.to_string(),
        description: condition.description,
        temperature_f: obs.main.temp,
    })
}

/// Pull the `message` out of an error body, or fall back to a snippet of it.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self) -> Result<WeatherReport, FeedError> {
        tracing::debug!(location = %self.location, "requesting weather");

        let resp = self.http.get(self.request_url()?).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(FeedError::Status {
                service: "weather service",
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_observation(&self.location, &text)
    }
}
