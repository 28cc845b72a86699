#[cfg(target_os = "espidf")]
use display_interface_spi::SPIInterface;
#[cfg(target_os = "espidf")]
use esp_idf_hal::adc::oneshot::AdcDriver;
#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::FreeRtos;
#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::PinDriver;
#[cfg(target_os = "espidf")]
use esp_idf_hal::peripherals::Peripherals;
#[cfg(target_os = "espidf")]
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
#[cfg(target_os = "espidf")]
use esp_idf_hal::task::watchdog::{TWDTConfig, TWDTDriver};
#[cfg(target_os = "espidf")]
use esp_idf_hal::units::FromValueType;

#[cfg(target_os = "espidf")]
use ili9341::{DisplaySize240x320, Ili9341, ModeState, Orientation};

#[cfg(target_os = "espidf")]
use std::time::Duration;

#[cfg(target_os = "espidf")]
use clapscope::display::{Colour, GraphicsSurface};
#[cfg(target_os = "espidf")]
use clapscope::input::AdcInputs;
#[cfg(target_os = "espidf")]
use clapscope::monitor::Monitor;
#[cfg(target_os = "espidf")]
use clapscope::scheduler::{Periodic, SystemClock};

#[cfg(target_os = "espidf")]
const WATCHDOG_FEED_US: u64 = 500_000; // Well inside the 2s timeout whatever a cycle costs

// M5Stack Fire pin map
// Microphone      GPIO34 (ADC1)
// Angle sensor    GPIO36 (ADC1)
// Speaker DAC     GPIO25
// LCD             SCLK 18 / MOSI 23 / MISO 19 / CS 14 / DC 27 / RST 33 / BL 32

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    esp_idf_hal::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!(
        "clapscope: {} [{}/{}] {}",
        env!("BUILD_TS"),
        env!("BUILD_BRANCH"),
        env!("BUILD_HASH"),
        env!("BUILD_PROFILE")
    );

    let peripherals = Peripherals::take()?;

    // Make sure the speaker is quiet
    let mut speaker = PinDriver::output(peripherals.pins.gpio25)?;
    speaker.set_low()?;

    // Hardware Watchdog - the sampling loop never yields so the idle task
    // can't be subscribed; the loop feeds it directly
    let twdt_config = TWDTConfig {
        duration: Duration::from_secs(2),
        panic_on_trigger: true,
        subscribed_idle_tasks: enumset::EnumSet::empty(),
    };
    let mut twdt_driver = TWDTDriver::new(peripherals.twdt, &twdt_config)?;

    // LCD
    let mut backlight = PinDriver::output(peripherals.pins.gpio32)?;
    backlight.set_high()?;
    let spi = SpiDriver::new(
        peripherals.spi2,
        peripherals.pins.gpio18,
        peripherals.pins.gpio23,
        Some(peripherals.pins.gpio19),
        &SpiDriverConfig::new(),
    )?;
    let spi = SpiDeviceDriver::new(
        spi,
        Some(peripherals.pins.gpio14),
        &SpiConfig::new().baudrate(40.MHz().into()),
    )?;
    let dc = PinDriver::output(peripherals.pins.gpio27)?;
    let rst = PinDriver::output(peripherals.pins.gpio33)?;
    let mut lcd = Ili9341::new(
        SPIInterface::new(spi, dc),
        rst,
        &mut FreeRtos,
        Orientation::Landscape,
        DisplaySize240x320,
    )
    .map_err(|e| anyhow::anyhow!("LCD init: {e:?}"))?;
    // The M5Stack panel (ILI9342C) shows inverted colours otherwise
    lcd.invert_mode(ModeState::On)
        .map_err(|e| anyhow::anyhow!("LCD invert: {e:?}"))?;
    let mut surface = GraphicsSurface::new(lcd);
    surface.clear(Colour::Background)?;
    log::info!("=== LCD ready");

    // Analog inputs
    let adc = AdcDriver::new(peripherals.adc1)?;
    let inputs = AdcInputs::new(&adc, peripherals.pins.gpio34, peripherals.pins.gpio36)?;

    let mut monitor = Monitor::new(inputs, surface, SystemClock::new());
    let mut watchdog = twdt_driver.watch_current_task()?;
    watchdog.feed()?;
    let mut feed_timer = Periodic::new(WATCHDOG_FEED_US, 0);

    let result = monitor.run(|cycle| {
        if feed_timer.due(cycle.released_us) {
            watchdog.feed()?;
        }
        Ok(())
    });

    if let Err(e) = result {
        log::error!("Sampling loop failed: {e} - Restarting");
    }
    esp_idf_hal::reset::restart();
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("clapscope runs on ESP-IDF (M5Stack Fire); build with the espidf target");
}
