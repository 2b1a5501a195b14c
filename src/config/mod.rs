//! Device configuration.
//!
//! The configuration is fixed when the firmware image is built. It is parsed
//! and validated once at startup by [`load`] and then handed to the network,
//! scheduling and rendering code by reference.

use core::str::FromStr;

use log::{debug, error, info};
use time::UtcOffset;

use crate::error::ConfigError;

mod night;
mod raw;
mod units;

pub use night::NightWindow;
pub use raw::RawConfig;
pub use units::Units;

/// Longest SSID accepted by 802.11.
pub const MAX_SSID_LEN: usize = 32;
/// Longest WPA2 passphrase.
pub const MAX_PASSWORD_LEN: usize = 64;
/// Longest location label that fits one line of the 296 px wide screen.
pub const MAX_LOCATION_NAME_LEN: usize = 48;

const LATITUDE_RANGE: &str = "-90..=90 degrees";
const LONGITUDE_RANGE: &str = "-180..=180 degrees";
const REFRESH_RANGE: &str = "at least 1 minute";
const HOUR_INTERVAL_RANGE: &str = "1..=8 hours";
const HOUR_RANGE: &str = "0..=23";
const OFFSET_RANGE: &str = "-93599..=93599 seconds";
const UVI_RANGE: &str = "0..=255";

/// Validated, immutable device configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfiguration<'a> {
    pub wifi_ssid: &'a str,
    pub wifi_password: &'a str,
    pub open_weather_map_api_key: &'a str,
    /// `None` disables the air quality feature.
    pub airnow_api_key: Option<&'a str>,
    pub units: Units,
    pub latitude: f64,
    pub longitude: f64,
    pub night_window: Option<NightWindow>,
    pub refresh_minutes: u32,
    /// Only used when no live timezone information is available.
    pub default_timezone_offset_seconds: i32,
    pub location_name: &'a str,
    pub uvi_threshold: u8,
    pub hour_interval: u8,
    pub low_power_mode: bool,
}

/// Load the configuration compiled into the firmware image.
pub fn load() -> Result<DeviceConfiguration<'static>, ConfigError> {
    DeviceConfiguration::load(&RawConfig::BUILD)
}

impl<'a> DeviceConfiguration<'a> {
    /// Parse and validate a raw configuration.
    pub fn load(raw: &RawConfig<'a>) -> Result<Self, ConfigError> {
        let config = Self::parse(raw).and_then(Self::validated);
        match &config {
            Ok(config) => log_config_summary(config),
            Err(e) => error!("Invalid configuration: {}", e),
        }
        config
    }

    /// Check the invariants of an already typed configuration and return it
    /// unchanged.
    pub fn validated(self) -> Result<Self, ConfigError> {
        require("wifi_ssid", self.wifi_ssid)?;
        require("wifi_password", self.wifi_password)?;
        require("open_weather_map_api_key", self.open_weather_map_api_key)?;

        if self.wifi_ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::TooLong {
                field: "wifi_ssid",
                max: MAX_SSID_LEN,
            });
        }
        if self.wifi_password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::TooLong {
                field: "wifi_password",
                max: MAX_PASSWORD_LEN,
            });
        }
        if self.location_name.len() > MAX_LOCATION_NAME_LEN {
            return Err(ConfigError::TooLong {
                field: "location_name",
                max: MAX_LOCATION_NAME_LEN,
            });
        }

        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::OutOfRange {
                field: "latitude",
                expected: LATITUDE_RANGE,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::OutOfRange {
                field: "longitude",
                expected: LONGITUDE_RANGE,
            });
        }

        if self.refresh_minutes < 1 {
            return Err(ConfigError::OutOfRange {
                field: "refresh_minutes",
                expected: REFRESH_RANGE,
            });
        }
        if !(1..=8).contains(&self.hour_interval) {
            return Err(ConfigError::OutOfRange {
                field: "hour_interval",
                expected: HOUR_INTERVAL_RANGE,
            });
        }
        if UtcOffset::from_whole_seconds(self.default_timezone_offset_seconds).is_err() {
            return Err(ConfigError::OutOfRange {
                field: "default_timezone_offset_seconds",
                expected: OFFSET_RANGE,
            });
        }

        Ok(self)
    }

    fn parse(raw: &RawConfig<'a>) -> Result<Self, ConfigError> {
        // Required text first, so a missing credential is reported before
        // any formatting mistake further down.
        require("wifi_ssid", raw.wifi_ssid)?;
        require("wifi_password", raw.wifi_password)?;
        require("open_weather_map_api_key", raw.open_weather_map_api_key)?;

        let night_start = raw
            .night_start_hour
            .map(|h| parse_int::<u8>("night_start_hour", h, HOUR_RANGE))
            .transpose()?;
        let night_end = raw
            .night_end_hour
            .map(|h| parse_int::<u8>("night_end_hour", h, HOUR_RANGE))
            .transpose()?;

        Ok(Self {
            wifi_ssid: raw.wifi_ssid,
            wifi_password: raw.wifi_password,
            open_weather_map_api_key: raw.open_weather_map_api_key,
            airnow_api_key: Some(raw.airnow_api_key).filter(|key| !key.is_empty()),
            units: Units::from_str(raw.units)?,
            latitude: parse_degrees("latitude", raw.latitude)?,
            longitude: parse_degrees("longitude", raw.longitude)?,
            night_window: NightWindow::from_hours(night_start, night_end)?,
            refresh_minutes: parse_int("refresh_minutes", raw.refresh_minutes, REFRESH_RANGE)?,
            default_timezone_offset_seconds: parse_int(
                "default_timezone_offset_seconds",
                raw.default_timezone_offset,
                OFFSET_RANGE,
            )?,
            location_name: raw.location_name,
            uvi_threshold: parse_int("uvi_threshold", raw.uvi_threshold, UVI_RANGE)?,
            hour_interval: parse_int("hour_interval", raw.hour_interval, HOUR_INTERVAL_RANGE)?,
            low_power_mode: parse_bool("low_power_mode", raw.low_power_mode)?,
        })
    }

    /// Whether the air quality lookup is enabled.
    pub fn aqi_enabled(&self) -> bool {
        self.airnow_api_key.is_some()
    }

    /// Whether `hour` (local time) lies in the configured night window.
    pub fn is_night(&self, hour: u8) -> bool {
        self.night_window.is_some_and(|night| night.contains(hour))
    }

    /// Whether a forecast UV index should be flagged.
    pub fn uvi_warning(&self, uvi: f32) -> bool {
        uvi >= f32::from(self.uvi_threshold)
    }

    /// Indices of the hourly forecast entries to display, spaced
    /// `hour_interval` apart, out of `available` entries.
    pub fn forecast_slots(&self, available: usize) -> impl Iterator<Item = usize> {
        (0..available).step_by(usize::from(self.hour_interval.max(1)))
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        u64::from(self.refresh_minutes) * 60
    }

    /// Fallback UTC offset as a `time` value.
    pub fn default_utc_offset(&self) -> UtcOffset {
        UtcOffset::from_whole_seconds(self.default_timezone_offset_seconds)
            .unwrap_or(UtcOffset::UTC)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingRequiredField { field });
    }
    Ok(())
}

/// Parse an integer, reporting values that do not fit `T` as out of range
/// rather than malformed.
fn parse_int<T: TryFrom<i64>>(
    field: &'static str,
    text: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value: i64 = text.trim().parse().map_err(|_| ConfigError::Malformed {
        field,
        expected: "integer",
    })?;
    T::try_from(value).map_err(|_| ConfigError::OutOfRange { field, expected })
}

fn parse_degrees(field: &'static str, text: &str) -> Result<f64, ConfigError> {
    text.trim().parse().map_err(|_| ConfigError::Malformed {
        field,
        expected: "decimal degree value",
    })
}

fn parse_bool(field: &'static str, text: &str) -> Result<bool, ConfigError> {
    match text.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidEnum {
            field,
            expected: "true, false",
        }),
    }
}

/// Log a summary of the loaded configuration. Credentials are never logged.
fn log_config_summary(config: &DeviceConfiguration<'_>) {
    info!(
        "Configuration loaded for {} ({:.4}, {:.4})",
        config.location_name, config.latitude, config.longitude
    );
    debug!("  WiFi SSID: {}", config.wifi_ssid);
    debug!("  units: {}", config.units.as_str());
    debug!("  refresh every {} min", config.refresh_minutes);
    debug!("  forecast every {} h", config.hour_interval);
    debug!("  AQI enabled: {}", config.aqi_enabled());
    debug!("  low power mode: {}", config.low_power_mode);
    if let Some(night) = config.night_window {
        debug!(
            "  night window: {:02}:00-{:02}:00",
            night.start_hour(),
            night.end_hour()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawConfig<'static> {
        RawConfig {
            wifi_ssid: "crow-net",
            wifi_password: "hunter22",
            open_weather_map_api_key: "owm_key",
            airnow_api_key: "airnow_key",
            units: "metric",
            latitude: "35.09",
            longitude: "135.55",
            night_start_hour: Some("22"),
            night_end_hour: Some("6"),
            refresh_minutes: "60",
            default_timezone_offset: "-18000",
            location_name: "Toronto",
            uvi_threshold: "3",
            hour_interval: "3",
            low_power_mode: "false",
        }
    }

    fn expected() -> DeviceConfiguration<'static> {
        DeviceConfiguration {
            wifi_ssid: "crow-net",
            wifi_password: "hunter22",
            open_weather_map_api_key: "owm_key",
            airnow_api_key: Some("airnow_key"),
            units: Units::Metric,
            latitude: 35.09,
            longitude: 135.55,
            night_window: Some(NightWindow::new(22, 6).unwrap()),
            refresh_minutes: 60,
            default_timezone_offset_seconds: -18000,
            location_name: "Toronto",
            uvi_threshold: 3,
            hour_interval: 3,
            low_power_mode: false,
        }
    }

    #[test]
    fn load_returns_input_fields() {
        assert_eq!(DeviceConfiguration::load(&raw()), Ok(expected()));
    }

    #[test]
    fn validated_returns_record_unchanged() {
        assert_eq!(expected().validated(), Ok(expected()));

        let imperial = DeviceConfiguration {
            units: Units::Imperial,
            airnow_api_key: None,
            night_window: None,
            low_power_mode: true,
            ..expected()
        };
        assert_eq!(imperial.validated(), Ok(imperial));
    }

    #[test]
    fn empty_airnow_key_disables_aqi() {
        let config = DeviceConfiguration::load(&RawConfig {
            airnow_api_key: "",
            ..raw()
        })
        .unwrap();
        assert_eq!(config.airnow_api_key, None);
        assert!(!config.aqi_enabled());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        for (raw, field) in [
            (
                RawConfig {
                    wifi_ssid: "",
                    ..raw()
                },
                "wifi_ssid",
            ),
            (
                RawConfig {
                    wifi_password: "",
                    ..raw()
                },
                "wifi_password",
            ),
            (
                RawConfig {
                    open_weather_map_api_key: "",
                    ..raw()
                },
                "open_weather_map_api_key",
            ),
        ] {
            assert_eq!(
                DeviceConfiguration::load(&raw),
                Err(ConfigError::MissingRequiredField { field })
            );
        }
    }

    #[test]
    fn missing_credential_reported_before_bad_units() {
        let raw = RawConfig {
            wifi_ssid: "",
            units: "kelvin",
            ..raw()
        };
        assert_eq!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::MissingRequiredField { field: "wifi_ssid" })
        );
    }

    #[test]
    fn latitude_91_is_out_of_range() {
        let raw = RawConfig {
            latitude: "91",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::OutOfRange {
                field: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn longitude_bounds() {
        for (text, ok) in [("-180", true), ("180", true), ("180.5", false)] {
            let raw = RawConfig {
                longitude: text,
                ..raw()
            };
            assert_eq!(DeviceConfiguration::load(&raw).is_ok(), ok, "{text}");
        }
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let raw = RawConfig {
            latitude: "NaN",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::OutOfRange {
                field: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn hour_interval_bounds() {
        for (text, ok) in [("0", false), ("1", true), ("8", true), ("9", false)] {
            let raw = RawConfig {
                hour_interval: text,
                ..raw()
            };
            let result = DeviceConfiguration::load(&raw);
            if ok {
                assert!(result.is_ok(), "{text}");
            } else {
                assert!(
                    matches!(
                        result,
                        Err(ConfigError::OutOfRange {
                            field: "hour_interval",
                            ..
                        })
                    ),
                    "{text}"
                );
            }
        }
    }

    #[test]
    fn kelvin_is_not_a_unit() {
        let raw = RawConfig {
            units: "kelvin",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::InvalidEnum { field: "units", .. })
        ));
    }

    #[test]
    fn refresh_minutes_boundary() {
        let zero = RawConfig {
            refresh_minutes: "0",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&zero),
            Err(ConfigError::OutOfRange {
                field: "refresh_minutes",
                ..
            })
        ));

        let one = RawConfig {
            refresh_minutes: "1",
            ..raw()
        };
        let config = DeviceConfiguration::load(&one).unwrap();
        assert_eq!(config.refresh_minutes, 1);
        assert_eq!(config.refresh_interval_secs(), 60);
    }

    #[test]
    fn negative_values_are_out_of_range() {
        let raw = RawConfig {
            refresh_minutes: "-5",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::OutOfRange {
                field: "refresh_minutes",
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_values_are_malformed() {
        let raw = RawConfig {
            refresh_minutes: "hourly",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::Malformed {
                field: "refresh_minutes",
                ..
            })
        ));

        let raw = RawConfig {
            latitude: "north",
            ..self::raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::Malformed {
                field: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn night_hours_must_be_in_a_day() {
        let raw = RawConfig {
            night_start_hour: Some("24"),
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::OutOfRange {
                field: "night_start_hour",
                ..
            })
        ));
    }

    #[test]
    fn lone_night_hour_is_rejected() {
        let raw = RawConfig {
            night_end_hour: None,
            ..raw()
        };
        assert_eq!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::MissingRequiredField {
                field: "night_end_hour"
            })
        );
    }

    #[test]
    fn no_night_window_means_always_day() {
        let config = DeviceConfiguration::load(&RawConfig {
            night_start_hour: None,
            night_end_hour: None,
            ..raw()
        })
        .unwrap();
        assert!((0..24).all(|h| !config.is_night(h)));
    }

    #[test]
    fn night_window_wraps_midnight() {
        let config = expected();
        assert!(config.is_night(23));
        assert!(config.is_night(2));
        assert!(!config.is_night(12));
    }

    #[test]
    fn low_power_mode_must_be_boolean() {
        let raw = RawConfig {
            low_power_mode: "yes",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::InvalidEnum {
                field: "low_power_mode",
                ..
            })
        ));
    }

    #[test]
    fn timezone_offset_must_be_representable() {
        let raw = RawConfig {
            default_timezone_offset: "100000",
            ..raw()
        };
        assert!(matches!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::OutOfRange {
                field: "default_timezone_offset_seconds",
                ..
            })
        ));
        assert_eq!(expected().default_utc_offset().whole_hours(), -5);
    }

    #[test]
    fn long_ssid_is_rejected() {
        let raw = RawConfig {
            wifi_ssid: "a-network-name-that-is-far-too-long",
            ..raw()
        };
        assert_eq!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::TooLong {
                field: "wifi_ssid",
                max: MAX_SSID_LEN
            })
        );
    }

    #[test]
    fn long_location_name_is_rejected() {
        let name = "Llanfairpwllgwyngyllgogerychwyrndrobwllllantysiliogogogoch";
        assert!(name.len() > MAX_LOCATION_NAME_LEN);
        let raw = RawConfig {
            location_name: name,
            ..raw()
        };
        assert_eq!(
            DeviceConfiguration::load(&raw),
            Err(ConfigError::TooLong {
                field: "location_name",
                max: MAX_LOCATION_NAME_LEN
            })
        );

        let fits = RawConfig {
            location_name: &name[..MAX_LOCATION_NAME_LEN],
            ..self::raw()
        };
        assert!(DeviceConfiguration::load(&fits).is_ok());
    }

    #[test]
    fn uvi_threshold_is_inclusive() {
        let config = expected();
        assert!(!config.uvi_warning(2.9));
        assert!(config.uvi_warning(3.0));
        assert!(config.uvi_warning(7.5));
    }

    #[test]
    fn forecast_slots_follow_interval() {
        let config = expected();
        let mut slots = config.forecast_slots(10);
        assert_eq!(slots.next(), Some(0));
        assert_eq!(slots.next(), Some(3));
        assert_eq!(slots.next(), Some(6));
        assert_eq!(slots.next(), Some(9));
        assert_eq!(slots.next(), None);
    }

    #[test]
    fn loads_from_json_document() {
        let doc = br#"{
            "wifi_ssid": "crow-net",
            "wifi_password": "hunter22",
            "open_weather_map_api_key": "owm_key",
            "airnow_api_key": "airnow_key",
            "units": "metric",
            "latitude": "35.09",
            "longitude": "135.55",
            "night_start_hour": "22",
            "night_end_hour": "6",
            "refresh_minutes": "60",
            "default_timezone_offset": "-18000",
            "location_name": "Toronto",
            "uvi_threshold": "3",
            "hour_interval": "3",
            "low_power_mode": "false"
        }"#;
        let raw = RawConfig::from_json(doc).unwrap();
        assert_eq!(DeviceConfiguration::load(&raw), Ok(expected()));
    }

    #[test]
    fn build_config_requires_credentials() {
        if RawConfig::BUILD.wifi_ssid.is_empty() {
            assert_eq!(
                load(),
                Err(ConfigError::MissingRequiredField { field: "wifi_ssid" })
            );
        }
    }
}
