#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_time::{Duration, Instant, Timer, with_deadline};
use esp_backtrace as _;
use esp_hal::{rng::Rng, rtc_cntl::Rtc, timer::timg::TimerGroup};
use esp_println::logger::init_logger;
use esp_radio::Controller;
use log::{error, info};
use weathercrow::{
    config::{self, DeviceConfiguration},
    error::AppError,
    network::{connection, net_task},
    schedule::SleepPlan,
    sleep::{enter_deep_sleep_secs, halt},
    status::status_text,
    weather::api::{build_airnow_query, build_one_call_query},
};

const SLEEP_ON_ERROR_SECS: u64 = 60 * 5;
const LINK_UP_TIMEOUT: Duration = Duration::from_secs(10);
const DHCP_TIMEOUT: Duration = Duration::from_secs(20);

const HEAP_KB: usize = 72;

esp_bootloader_esp_idf::esp_app_desc!();

// Use https://docs.rs/static_cell/2.1.1/static_cell/macro.make_static.html
// once rust feature(type_alias_impl_trait) is stable
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

/// Wait for the link and a DHCP lease, each with its own deadline.
async fn wait_for_network(stack: Stack<'static>) -> Result<(), AppError> {
    with_deadline(Instant::now() + LINK_UP_TIMEOUT, async {
        while !stack.is_link_up() {
            Timer::after(Duration::from_millis(500)).await;
        }
    })
    .await
    .map_err(|_| {
        error!("Timed out waiting for link up");
        AppError::NetworkTimeout
    })?;

    with_deadline(Instant::now() + DHCP_TIMEOUT, async {
        loop {
            if let Some(config) = stack.config_v4() {
                info!("Got IP: {}", config.address);
                break;
            }
            Timer::after(Duration::from_millis(500)).await;
        }
    })
    .await
    .map_err(|_| {
        error!("Timed out waiting for IP address");
        AppError::NetworkTimeout
    })
}

/// Log the API calls the configured station makes on each refresh.
fn log_requests(config: &DeviceConfiguration<'_>) -> Result<(), AppError> {
    let one_call = build_one_call_query(config)?;
    info!("Weather endpoint: {}", one_call.host);
    if let Some(airnow) = build_airnow_query(config)? {
        info!("Air quality endpoint: {}", airnow.host);
    }
    Ok(())
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // Initialize logger for esp-println
    init_logger(log::LevelFilter::Info);
    esp_alloc::heap_allocator!(size: HEAP_KB * 1024);

    info!("Initialize peripherals");
    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialize RTC for deep sleep
    let rtc = Rtc::new(peripherals.LPWR);

    // An invalid configuration cannot fix itself, so there is nothing to retry
    let config = match config::load() {
        Ok(config) => &*mk_static!(DeviceConfiguration<'static>, config),
        Err(e) => {
            error!("{}", AppError::from(e));
            halt(rtc);
        }
    };
    info!("{}", status_text(config, None));

    // Initialize and start RTOS timer
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Initialize radio and WiFi controller
    let esp_radio_ctrl = &*mk_static!(
        Controller<'static>,
        match esp_radio::init() {
            Ok(ctrl) => ctrl,
            Err(e) => {
                error!("Failed to initialize radio: {:?}", e);
                enter_deep_sleep_secs(rtc, SLEEP_ON_ERROR_SECS);
            }
        }
    );
    let (controller, interfaces) =
        match esp_radio::wifi::new(esp_radio_ctrl, peripherals.WIFI, Default::default()) {
            Ok(wifi) => wifi,
            Err(e) => {
                error!("{}: {:?}", AppError::WifiInit, e);
                enter_deep_sleep_secs(rtc, SLEEP_ON_ERROR_SECS);
            }
        };

    // init network stack
    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | (rng.random() as u64);
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        net_config,
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        seed,
    );

    // spawn network tasks
    spawner.spawn(connection(controller, config)).ok();
    spawner.spawn(net_task(runner)).ok();

    if let Err(e) = wait_for_network(stack).await {
        error!("{}", e);
        enter_deep_sleep_secs(rtc, SLEEP_ON_ERROR_SECS);
    }

    loop {
        if let Err(e) = log_requests(config) {
            error!("{}", e);
        }

        // no clock source yet, so the night window cannot shorten the plan
        match SleepPlan::next(config, None) {
            SleepPlan::Deep { secs } => enter_deep_sleep_secs(rtc, secs),
            SleepPlan::Awake { secs } => {
                info!("Next refresh in {secs} secs");
                Timer::after(Duration::from_secs(secs)).await;
            }
        }
    }
}
