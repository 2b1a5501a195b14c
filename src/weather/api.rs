use core::fmt::Write as _;

use crate::{config::DeviceConfiguration, error::AppError, weather::url_encode_component};

use super::Endpoint;

extern crate alloc;
use alloc::string::String;

pub const HEADERS_STR: &str = "Accept: application/json";
pub const OPEN_WEATHER_MAP_URL: &str = "api.openweathermap.org";
pub const AIRNOW_URL: &str = "www.airnowapi.org";

/// Search radius in miles for the nearest AirNow reporting area.
const AIRNOW_DISTANCE_MILES: u32 = 25;

/// Format a coordinate with 6 decimal places, percent-encoded.
fn encode_degrees(value: f64) -> Result<String, AppError> {
    let mut buf = String::new();
    write!(buf, "{:.6}", value).map_err(|_| AppError::RequestBuildFailed)?;
    url_encode_component(&buf)
}

/// Build the OpenWeatherMap One Call request for the configured location.
///
/// Minutely data is excluded; the hourly and daily blocks feed the forecast
/// and UV index views.
pub fn build_one_call_query(config: &DeviceConfiguration<'_>) -> Result<Endpoint, AppError> {
    let lat_enc = encode_degrees(config.latitude)?;
    let long_enc = encode_degrees(config.longitude)?;
    let key_enc = url_encode_component(config.open_weather_map_api_key)?;

    let mut target = String::new();
    write!(
        target,
        "/data/3.0/onecall?lat={}&lon={}&units={}&exclude=minutely&appid={}",
        lat_enc,
        long_enc,
        config.units.as_str(),
        key_enc
    )
    .map_err(|_| AppError::RequestBuildFailed)?;

    Ok(Endpoint {
        host: OPEN_WEATHER_MAP_URL,
        target,
    })
}

/// Build the AirNow current observation request, or `None` when no AirNow
/// key is configured.
pub fn build_airnow_query(
    config: &DeviceConfiguration<'_>,
) -> Result<Option<Endpoint>, AppError> {
    let Some(api_key) = config.airnow_api_key else {
        log::debug!("No AirNow API key configured, skipping AQI");
        return Ok(None);
    };

    let lat_enc = encode_degrees(config.latitude)?;
    let long_enc = encode_degrees(config.longitude)?;
    let key_enc = url_encode_component(api_key)?;

    let mut target = String::new();
    write!(
        target,
        "/aq/observation/latLong/current/?format=application/json&latitude={}&longitude={}&distance={}&API_KEY={}",
        lat_enc, long_enc, AIRNOW_DISTANCE_MILES, key_enc
    )
    .map_err(|_| AppError::RequestBuildFailed)?;

    Ok(Some(Endpoint {
        host: AIRNOW_URL,
        target,
    }))
}
