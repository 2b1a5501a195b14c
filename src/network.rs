use embassy_net::Runner;
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};
use log::{error, info};

use crate::config::DeviceConfiguration;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

fn client_config(config: &DeviceConfiguration<'_>) -> ModeConfig {
    ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(config.wifi_ssid.into())
            .with_password(config.wifi_password.into()),
    )
}

/// Keeps the station associated with the configured network.
#[embassy_executor::task]
pub async fn connection(
    mut controller: WifiController<'static>,
    config: &'static DeviceConfiguration<'static>,
) {
    info!("Starting connection task");
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            info!("WiFi disconnected");
            Timer::after(RECONNECT_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            if let Err(e) = controller.set_config(&client_config(config)) {
                error!("Failed to set WiFi config: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                error!("Failed to start WiFi: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
        }

        info!("Connecting to SSID {}", config.wifi_ssid);
        match controller.connect_async().await {
            Ok(_) => info!("WiFi connected"),
            Err(e) => {
                error!("Failed to connect to WiFi: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
