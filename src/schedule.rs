use time::Time;

use crate::config::DeviceConfiguration;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// What the device does between two refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepPlan {
    /// Power down completely and wake up (reset) after `secs`.
    Deep { secs: u64 },
    /// Stay powered and wait `secs` before refreshing again.
    Awake { secs: u64 },
}

impl SleepPlan {
    /// Decide how long to wait before the next refresh.
    ///
    /// Battery powered devices deep sleep between refreshes. During the
    /// night window they sleep straight through to the end of the night
    /// instead of waking up just to redraw the night screen. `local_now`
    /// is `None` when the wall-clock time is not known yet.
    pub fn next(config: &DeviceConfiguration<'_>, local_now: Option<Time>) -> Self {
        let refresh = config.refresh_interval_secs();
        if !config.low_power_mode {
            return SleepPlan::Awake { secs: refresh };
        }

        let until_morning = match (config.night_window, local_now) {
            (Some(night), Some(now)) if night.contains(now.hour()) => {
                Some(secs_until_hour(now, night.end_hour()))
            }
            _ => None,
        };

        match until_morning {
            Some(secs) if secs > refresh => {
                log::info!("Night time, sleeping until {:02}:00", end_hour(config));
                SleepPlan::Deep { secs }
            }
            _ => SleepPlan::Deep { secs: refresh },
        }
    }

    pub fn secs(&self) -> u64 {
        match self {
            SleepPlan::Deep { secs } | SleepPlan::Awake { secs } => *secs,
        }
    }
}

fn end_hour(config: &DeviceConfiguration<'_>) -> u8 {
    config.night_window.map_or(0, |night| night.end_hour())
}

/// Seconds from `now` until the next occurrence of `hour`:00:00.
fn secs_until_hour(now: Time, hour: u8) -> u64 {
    let now_secs =
        u64::from(now.hour()) * 3600 + u64::from(now.minute()) * 60 + u64::from(now.second());
    let target = u64::from(hour) * 3600;
    if target > now_secs {
        target - now_secs
    } else {
        SECS_PER_DAY - now_secs + target
    }
}
