use crate::error::ConfigError;

/// Hours of the day during which the display and power behaviour switch to
/// night mode. The window may wrap past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    start_hour: u8,
    end_hour: u8,
}

impl NightWindow {
    /// Build a window from its start (inclusive) and end (exclusive) hours.
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, ConfigError> {
        if start_hour > 23 {
            return Err(ConfigError::OutOfRange {
                field: "night_start_hour",
                expected: "0..=23",
            });
        }
        if end_hour > 23 {
            return Err(ConfigError::OutOfRange {
                field: "night_end_hour",
                expected: "0..=23",
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// Combine the two optional hours. Both or neither must be set.
    pub fn from_hours(start: Option<u8>, end: Option<u8>) -> Result<Option<Self>, ConfigError> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (Some(_), None) => Err(ConfigError::MissingRequiredField {
                field: "night_end_hour",
            }),
            (None, Some(_)) => Err(ConfigError::MissingRequiredField {
                field: "night_start_hour",
            }),
        }
    }

    pub fn start_hour(&self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u8 {
        self.end_hour
    }

    /// Whether `hour` (0-23, local time) falls inside the window.
    ///
    /// `22..6` covers 22:00 through 05:59. A window whose start equals its
    /// end is empty.
    pub fn contains(&self, hour: u8) -> bool {
        let hour = hour % 24;
        if self.start_hour <= self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}
