use esp_hal::rtc_cntl::Rtc;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use log::{error, info};

/// Enter deep sleep mode with timer wakeup
///
/// # Note
/// This function does not return - the device resets when it wakes up and
/// loads its configuration again from scratch.
pub fn enter_deep_sleep_secs(mut rtc: Rtc, sleep_duration_secs: u64) -> ! {
    info!("Entering deep sleep for {sleep_duration_secs} secs");

    let timer = TimerWakeupSource::new(core::time::Duration::from_secs(sleep_duration_secs));
    rtc.sleep_deep(&[&timer]);
}

/// Power down without a wakeup source.
///
/// Used when the firmware cannot run at all (invalid configuration); only a
/// reset or re-flash brings the device back.
pub fn halt(mut rtc: Rtc) -> ! {
    error!("Halting until reset");
    rtc.sleep_deep(&[]);
}
