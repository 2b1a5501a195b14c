use core::fmt::Write as _;

use heapless::String;
use time::OffsetDateTime;

use crate::{
    config::DeviceConfiguration,
    timezone::{format_date, format_offset},
};

pub const STATUS_LEN: usize = 512;

/// Build the human-readable status screen for the configured station.
///
/// `local_now` is the current local time when known; it adds the date line
/// and decides which UTC offset is shown.
pub fn status_text(
    config: &DeviceConfiguration<'_>,
    local_now: Option<OffsetDateTime>,
) -> String<STATUS_LEN> {
    let mut out: String<STATUS_LEN> = String::new();

    let _ = writeln!(out, "{}", config.location_name);
    if let Some(now) = local_now {
        let _ = writeln!(out, "{}", format_date(now.date()));
    }

    let offset = local_now.map_or_else(|| config.default_utc_offset(), |now| now.offset());
    let _ = writeln!(
        out,
        "({:.4}, {:.4})  {}",
        config.latitude,
        config.longitude,
        format_offset(offset)
    );
    let _ = writeln!(
        out,
        "units: {} ({}, {})",
        config.units.as_str(),
        config.units.temperature_symbol(),
        config.units.wind_speed_unit()
    );
    let _ = writeln!(
        out,
        "refresh every {} min, forecast every {} h",
        config.refresh_minutes, config.hour_interval
    );

    match config.night_window {
        Some(night) => {
            let _ = writeln!(
                out,
                "night: {:02}:00-{:02}:00",
                night.start_hour(),
                night.end_hour()
            );
        }
        None => {
            let _ = writeln!(out, "night: off");
        }
    }

    let _ = writeln!(
        out,
        "UV warning at {}+, AQI {}",
        config.uvi_threshold,
        if config.aqi_enabled() { "on" } else { "off" }
    );
    let _ = write!(
        out,
        "power: {}",
        if config.low_power_mode {
            "battery"
        } else {
            "mains"
        }
    );

    out
}

impl From<&DeviceConfiguration<'_>> for String<STATUS_LEN> {
    fn from(config: &DeviceConfiguration<'_>) -> Self {
        status_text(config, None)
    }
}
