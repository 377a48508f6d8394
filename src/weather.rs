//! Pass-through weather lookup against a wttr.in style JSON endpoint.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::constants::ERR_EMPTY_CITY;
use crate::error::{AppError, Result};

/// Weather reply returned to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOut {
    pub city: String,
    /// Degrees Celsius
    pub temperature: f64,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct WttrReport {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

/// Fetch the current conditions for `city`
pub async fn get_weather(client: &reqwest::Client, base_url: &str, city: &str) -> Result<WeatherOut> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AppError::InvalidInput(ERR_EMPTY_CITY.to_string()));
    }

    let url = weather_url(base_url, city)?;
    tracing::debug!(%url, "Fetching weather");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::WeatherUnavailable(e.to_string()))?;

    let body = response
        .text()
        .await
        .map_err(|e| AppError::WeatherUnavailable(e.to_string()))?;

    parse_report(city, &body)
}

fn weather_url(base_url: &str, city: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::WeatherUnavailable(format!("invalid weather base URL: {e}")))?;

    url.path_segments_mut()
        .map_err(|_| AppError::WeatherUnavailable("weather base URL cannot hold a path".to_string()))?
        .pop_if_empty()
        .push(city);
    url.query_pairs_mut().append_pair("format", "j1");

    Ok(url)
}

fn parse_report(city: &str, body: &str) -> Result<WeatherOut> {
    let report: WttrReport =
        serde_json::from_str(body).map_err(|e| AppError::WeatherParse(e.to_string()))?;

    let current = report
        .current_condition
        .into_iter()
        .next()
        .ok_or_else(|| AppError::WeatherNotFound(city.to_string()))?;

    let temperature = current
        .temp_c
        .trim()
        .parse::<f64>()
        .map_err(|e| AppError::WeatherParse(format!("temp_C: {e}")))?;

    let description = current
        .weather_desc
        .into_iter()
        .next()
        .map(|d| d.value)
        .ok_or_else(|| AppError::WeatherParse("missing weatherDesc".to_string()))?;

    Ok(WeatherOut {
        city: city.to_string(),
        temperature,
        description,
    })
}
