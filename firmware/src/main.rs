#![no_std]
#![no_main]

mod bus;
mod pins;

use esp_backtrace as _;
use esp_hal::{delay::Delay, entry};
use esp_println::println;
use log::{error, info};
use pmw3389::{register, Config, Pmw3389};

use crate::{bus::SensorBus, pins::SensorPins};

const PMW3389_SROM: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/pmw3389_srom.bin"));

// Lands in Resolution_H, Resolution_L keeps its reset value
const DPI: u8 = 15;

const POLL_INTERVAL_MS: u32 = 1000;

// Reading Motion first latches the four delta registers
const MOTION_REGISTERS: [u8; 5] = [
    register::MOTION,
    register::DELTA_X_L,
    register::DELTA_X_H,
    register::DELTA_Y_L,
    register::DELTA_Y_H,
];

#[entry]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    let pins = SensorPins {
        sck: peripherals.GPIO13,
        mosi: peripherals.GPIO11,
        miso: peripherals.GPIO12,
        ncs: peripherals.GPIO10,
    };
    let bus = match SensorBus::new(peripherals.SPI2, pins) {
        Ok(bus) => bus,
        Err(e) => panic!("SPI setup failed: {:?}", e),
    };

    let sensor = Pmw3389::new(bus, Delay::new(), PMW3389_SROM, Config::default());

    // No partial operation is possible, a failed bring-up is fatal
    let mut sensor = match sensor.initialize(DPI) {
        Ok(sensor) => sensor,
        Err(e) => panic!("PMW3389 bring-up failed: {:?}", e),
    };

    match sensor.product_info() {
        Ok(id) => println!("productID: {}\nrevisionID: {}", id.product_id, id.revision_id),
        Err(e) => error!("cannot read product info: {:?}", e),
    }
    if let Err(e) = sensor.verify_product() {
        error!("{:?}", e);
    }
    match sensor.srom_id() {
        Ok(0) => error!("SROM did not load"),
        Ok(id) => info!("SROM ID {:#04x}", id),
        Err(e) => error!("cannot read SROM ID: {:?}", e),
    }

    let delay = Delay::new();
    loop {
        let mut raw = [0u8; 5];
        let mut result = Ok(());
        for (addr, value) in MOTION_REGISTERS.iter().zip(raw.iter_mut()) {
            match sensor.read_register(*addr) {
                Ok(v) => *value = v,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        match result {
            Ok(()) => println!(
                "motion: {:#04x} dx: {:#04x} {:#04x} dy: {:#04x} {:#04x}",
                raw[0], raw[2], raw[1], raw[4], raw[3]
            ),
            Err(e) => error!("poll failed: {:?}", e),
        }

        delay.delay_millis(POLL_INTERVAL_MS);
    }
}
