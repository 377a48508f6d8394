use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::weather::{get_weather, WeatherOut};
use crate::AppState;

pub async fn weather_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherOut>> {
    let weather = get_weather(&state.http, &state.config.weather_base_url, &city).await?;
    Ok(Json(weather))
}
