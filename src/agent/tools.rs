//! The HTTP side of the agent's three tools.
//!
//! Every call returns a string for the user or the model; failures are
//! described in that string rather than returned as errors.

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

/// Longest non-JSON body passed on, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
struct WeatherReply {
    city: String,
    temperature: Value,
    description: String,
}

#[derive(Debug, Clone)]
pub struct Tools {
    http: reqwest::Client,
    api_base: String,
}

impl Tools {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }

    /// Fetch `url` and render the body as pretty JSON or truncated text
    pub async fn fetch_url_content(&self, url: &str, method: &str, data: Option<&Value>) -> String {
        let method = method.trim().to_uppercase();
        tracing::info!(url, method = %method, data = ?data, "Fetching URL");

        let method = match method.as_str() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            other => return format!("Unsupported HTTP method: {other}"),
        };

        let mut request = self.http.request(method.clone(), url);
        if matches!(method, Method::POST | Method::PUT) {
            if let Some(data) = data {
                request = request.json(data);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url, error = %e, "Fetch error");
                return format!("FETCH_ERROR: {e}");
            }
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(url, error = %e, "Fetch error");
                return format!("FETCH_ERROR: {e}");
            }
        };

        tracing::info!(url, "Response received");
        render_body(&body)
    }

    /// Look up the weather through the API and format it for the user
    pub async fn call_weather(&self, city: &str) -> String {
        let city = city.trim();
        tracing::info!(city, "Fetching weather");

        let mut url = match reqwest::Url::parse(&format!("{}/weather/city/", self.api_base)) {
            Ok(url) => url,
            Err(e) => return format!("Error fetching weather: {e}"),
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(city);
        }

        let reply = async {
            self.http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<WeatherReply>()
                .await
        }
        .await;

        match reply {
            Ok(weather) => {
                let result = format!(
                    "{}: {}, {}",
                    weather.city,
                    weather.description,
                    format_temperature(&weather.temperature)
                );
                tracing::info!(result = %result, "Weather result");
                result
            }
            Err(e) => {
                tracing::error!(city, error = %e, "Error fetching weather");
                format!("Error fetching weather: {e}")
            }
        }
    }

    /// Proxy a CRUD call to `/users` or `/users/{id}`
    pub async fn call_user_api(&self, method: &str, user_id: Option<&str>, data: Option<&Value>) -> String {
        let url = match user_id {
            Some(id) => format!("{}/users/{id}", self.api_base),
            None => format!("{}/users", self.api_base),
        };
        tracing::info!(url = %url, method, "Calling user API");

        self.fetch_url_content(&url, method, data).await
    }
}

fn render_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.chars().take(MAX_TEXT_CHARS).collect(),
    }
}

/// `21` -> `21°C`; strings keep their own unit but lose a doubled one
pub fn format_temperature(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(t) => format!("{t}°C"),
            None => format!("{n}°C"),
        },
        Value::String(s) => s.replace("°C°C", "°C").replace("°C °C", "°C"),
        other => other.to_string(),
    }
}
