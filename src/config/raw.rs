use serde::Deserialize;
use serde_json_core::{self as json_core};

use crate::error::ConfigError;

/// Reads a build-time environment variable, falling back to `$default`.
macro_rules! build_env {
    ($name:literal, $default:expr) => {
        match option_env!($name) {
            Some(value) => value,
            None => $default,
        }
    };
}

/// Configuration exactly as written by the user: every value is text.
///
/// This is the input to [`DeviceConfiguration::load`](super::DeviceConfiguration::load),
/// either compiled in from the build environment ([`RawConfig::BUILD`]) or
/// read from a JSON provisioning document ([`RawConfig::from_json`]).
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawConfig<'a> {
    pub wifi_ssid: &'a str,
    pub wifi_password: &'a str,
    pub open_weather_map_api_key: &'a str,
    /// Leave empty to skip AQI.
    #[serde(default)]
    pub airnow_api_key: &'a str,
    pub units: &'a str,
    pub latitude: &'a str,
    pub longitude: &'a str,
    #[serde(default, borrow)]
    pub night_start_hour: Option<&'a str>,
    #[serde(default, borrow)]
    pub night_end_hour: Option<&'a str>,
    pub refresh_minutes: &'a str,
    pub default_timezone_offset: &'a str,
    pub location_name: &'a str,
    pub uvi_threshold: &'a str,
    pub hour_interval: &'a str,
    pub low_power_mode: &'a str,
}

impl RawConfig<'static> {
    /// Values baked into the firmware image.
    ///
    /// Credentials and API keys have no default and must be supplied at
    /// build time, e.g. `WIFI_SSID=... OPEN_WEATHER_MAP_API_KEY=... cargo build`.
    pub const BUILD: RawConfig<'static> = RawConfig {
        wifi_ssid: build_env!("WIFI_SSID", ""),
        wifi_password: build_env!("WIFI_PASSWORD", ""),
        open_weather_map_api_key: build_env!("OPEN_WEATHER_MAP_API_KEY", ""),
        airnow_api_key: build_env!("AIRNOW_API_KEY", ""),
        units: build_env!("UNITS", "metric"),
        latitude: build_env!("LATITUDE", "20.4255911"),
        longitude: build_env!("LONGITUDE", "136.0809294"),
        night_start_hour: option_env!("NIGHT_START_HOUR"),
        night_end_hour: option_env!("NIGHT_END_HOUR"),
        refresh_minutes: build_env!("REFRESH_MINUTES", "60"),
        // Eastern Time: -5 hours from UTC
        default_timezone_offset: build_env!("DEFAULT_TIMEZONE_OFFSET", "-18000"),
        location_name: build_env!("LOCATION_NAME", "Toronto"),
        uvi_threshold: build_env!("UVI_THRESHOLD", "3"),
        hour_interval: build_env!("HOUR_INTERVAL", "3"),
        low_power_mode: build_env!("LOW_POWER_MODE", "false"),
    };
}

impl<'a> RawConfig<'a> {
    /// Parse a JSON provisioning document. Values are JSON strings using the
    /// same names as the struct fields; the night hours may be omitted.
    pub fn from_json(value: &'a [u8]) -> Result<Self, ConfigError> {
        // serde_json_core::from_slice returns (T, consumed)
        let (parsed, _consumed) = json_core::from_slice::<RawConfig<'a>>(value).map_err(|e| {
            log::error!("Failed to parse configuration JSON: {:?}", e);
            ConfigError::Json
        })?;
        parsed.reject_escapes()?;
        Ok(parsed)
    }

    /// serde-json-core hands out borrowed strings with escape sequences left
    /// in place, so any backslash means the value would not match the text
    /// the user wrote.
    fn reject_escapes(&self) -> Result<(), ConfigError> {
        let fields = [
            ("wifi_ssid", Some(self.wifi_ssid)),
            ("wifi_password", Some(self.wifi_password)),
            ("open_weather_map_api_key", Some(self.open_weather_map_api_key)),
            ("airnow_api_key", Some(self.airnow_api_key)),
            ("units", Some(self.units)),
            ("latitude", Some(self.latitude)),
            ("longitude", Some(self.longitude)),
            ("night_start_hour", self.night_start_hour),
            ("night_end_hour", self.night_end_hour),
            ("refresh_minutes", Some(self.refresh_minutes)),
            ("default_timezone_offset", Some(self.default_timezone_offset)),
            ("location_name", Some(self.location_name)),
            ("uvi_threshold", Some(self.uvi_threshold)),
            ("hour_interval", Some(self.hour_interval)),
            ("low_power_mode", Some(self.low_power_mode)),
        ];
        for (field, value) in fields {
            if value.is_some_and(|v| v.contains('\\')) {
                return Err(ConfigError::Malformed {
                    field,
                    expected: "string without escape sequences",
                });
            }
        }
        Ok(())
    }
}

impl<'a> core::convert::TryFrom<&'a [u8]> for RawConfig<'a> {
    type Error = ConfigError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        RawConfig::from_json(value)
    }
}
