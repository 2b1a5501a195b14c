use core::str::FromStr;

use crate::error::ConfigError;

/// Measurement system used for API requests and on-screen values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units=` query parameter understood by OpenWeatherMap.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> char {
        match self {
            Units::Metric => 'C',
            Units::Imperial => 'F',
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl FromStr for Units {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(ConfigError::InvalidEnum {
                field: "units",
                expected: "metric, imperial",
            }),
        }
    }
}
