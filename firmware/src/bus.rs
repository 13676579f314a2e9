use core::convert::Infallible;

use esp_hal::{
    gpio::{Level, Output},
    peripherals::SPI2,
    spi::{
        master::{Config, ConfigError, Spi},
        Error as SpiError, Mode,
    },
    time::RateExtU32,
    Blocking,
};
use pmw3389::{BusClock, SpiTransport, SpiTransportError, Transport};

use crate::pins::SensorPins;

const STANDARD_CLOCK_KHZ: u32 = 1_000;
// Datasheet maximum for the SROM burst
const SROM_CLOCK_KHZ: u32 = 2_000;

#[derive(Debug)]
pub enum BusError {
    Transport(SpiTransportError<SpiError, Infallible>),
    Clock(ConfigError),
}

fn spi_config(clock: BusClock) -> Config {
    let khz = match clock {
        BusClock::Standard => STANDARD_CLOCK_KHZ,
        BusClock::SromDownload => SROM_CLOCK_KHZ,
    };
    Config::default().with_frequency(khz.kHz()).with_mode(Mode::_3)
}

/// SPI2 in mode 3 with NCS on a GPIO, retuning its clock for the SROM burst.
pub struct SensorBus<'d> {
    inner: SpiTransport<Spi<'d, Blocking>, Output<'d>>,
}

impl<'d> SensorBus<'d> {
    pub fn new(spi2: SPI2, pins: SensorPins) -> Result<Self, BusError> {
        let spi = Spi::new(spi2, spi_config(BusClock::Standard))
            .map_err(BusError::Clock)?
            .with_sck(pins.sck)
            .with_mosi(pins.mosi)
            .with_miso(pins.miso);
        let ncs = Output::new(pins.ncs, Level::High);

        let inner = SpiTransport::new(spi, ncs).map_err(BusError::Transport)?;
        Ok(SensorBus { inner })
    }
}

impl Transport for SensorBus<'_> {
    type Error = BusError;

    fn assert_select(&mut self) -> Result<(), BusError> {
        self.inner.assert_select().map_err(BusError::Transport)
    }

    fn deassert_select(&mut self) -> Result<(), BusError> {
        self.inner.deassert_select().map_err(BusError::Transport)
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), BusError> {
        self.inner.transfer(tx, rx).map_err(BusError::Transport)
    }

    fn set_clock(&mut self, clock: BusClock) -> Result<(), BusError> {
        self.inner
            .bus_mut()
            .apply_config(&spi_config(clock))
            .map_err(BusError::Clock)
    }
}
