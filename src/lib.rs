//! Blocking driver for the PixArt PMW3389 optical motion sensor.
//!
//! The chip has no persistent program memory, every power cycle it has to
//! be shut down, reset, fed its SROM image over the bus and configured, in
//! that order and with minimum delays in between. Nothing acknowledges any
//! of these steps, so the order is encoded in the types: each stage of
//! [Pmw3389] only offers the next transition and [Pmw3389::initialize]
//! walks through all of them.
//!
//! ```ignore
//! let transport = SpiTransport::new(spi, ncs)?;
//! let sensor = Pmw3389::new(transport, delay, SROM, Config::default());
//! let mut sensor = sensor.initialize(15)?;
//! let dx_l = sensor.read_register(register::DELTA_X_L)?;
//! ```
//!
//! Stages consume the driver, a failed step drops the transport. Pass
//! `&mut transport` and `&mut delay` to keep them for another attempt.
//!
//! The register framing and the SROM upload are internal, the only way to
//! reach them is through the stages:
//!
//! ```compile_fail
//! use pmw3389::load_srom;
//! ```
//!
//! ```compile_fail
//! use pmw3389::RegisterBus;
//! ```

#![cfg_attr(not(test), no_std)]

mod config;
mod error;
mod protocol;
pub mod register;
mod srom;
mod transport;

#[cfg(test)]
mod mock;

use core::marker::PhantomData;

use crate::protocol::RegisterBus;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

pub use config::{Config, LiftCutoff};
pub use error::Error;
pub use register::MotionStatus;
pub use transport::{BusClock, SpiTransport, SpiTransportError, Transport};

/// Minimum waits of the bring-up sequence, in milliseconds.
/// Longer is always fine.
mod timing {
    pub const IDLE_MS: u32 = 3;
    pub const SHUTDOWN_MS: u32 = 300;
    pub const NCS_PULSE_MS: u32 = 1;
    pub const POWER_UP_RESET_MS: u32 = 50;
    pub const SROM_ENABLE_MS: u32 = 10;
    pub const SROM_COMMIT_MS: u32 = 15;
    pub const CONFIGURATION_MS: u32 = 1;
}

/// Where the chip is in its bring-up. Not readable from the hardware,
/// only known from which stage the driver is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    Unpowered,
    Reset,
    PoweredUp,
    SromLoading,
    SromLoaded,
    Configured,
    Operational,
}

/// Type-level stages of [Pmw3389].
pub mod state {
    use super::DeviceState;

    mod sealed {
        pub trait Sealed {}
    }

    pub trait Stage: sealed::Sealed {
        const STATE: DeviceState;
    }

    macro_rules! stage {
        ($($name:ident),*) => {
            $(
                #[derive(Debug)]
                pub struct $name;
                impl sealed::Sealed for $name {}
                impl Stage for $name {
                    const STATE: DeviceState = DeviceState::$name;
                }
            )*
        };
    }

    stage!(Unpowered, Reset, PoweredUp, SromLoading, SromLoaded, Configured, Operational);
}

use state::{
    Configured, Operational, PoweredUp, Reset, SromLoaded, SromLoading, Stage, Unpowered,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProductInfo {
    pub product_id: u8,
    pub revision_id: u8,
}

pub struct Pmw3389<T, D, S = Unpowered> {
    bus: RegisterBus<T, D>,
    firmware: &'static [u8],
    config: Config,
    _stage: PhantomData<S>,
}

impl<T, D, S, E> Pmw3389<T, D, S>
where
    T: Transport<Error = E>,
    D: DelayNs,
    S: Stage,
{
    /// Stage of the bring-up, as tracked by the type.
    pub fn state(&self) -> DeviceState {
        S::STATE
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the transport and delay, whatever the stage. NCS is
    /// always high at this point.
    pub fn release(self) -> (T, D) {
        self.bus.release()
    }

    fn into_stage<N: Stage>(self) -> Pmw3389<T, D, N> {
        debug!("{:?} -> {:?}", S::STATE, N::STATE);
        Pmw3389 {
            bus: self.bus,
            firmware: self.firmware,
            config: self.config,
            _stage: PhantomData,
        }
    }
}

impl<T, D, E> Pmw3389<T, D, Unpowered>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// `firmware` is the SROM image, uploaded byte for byte on every
    /// initialization.
    pub fn new(transport: T, delay: D, firmware: &'static [u8], config: Config) -> Self {
        Pmw3389 {
            bus: RegisterBus::new(transport, delay, config.read_address_wait_us),
            firmware,
            config,
            _stage: PhantomData,
        }
    }

    /// Bring the sensor from whatever it was doing to an operational state
    /// at the given resolution.
    ///
    /// Takes a bit over 380ms. Any transport error aborts the sequence,
    /// the only way forward is to start over.
    pub fn initialize(self, dpi: u8) -> Result<Pmw3389<T, D, Operational>, Error<E>> {
        info!("initializing PMW3389, resolution {}", dpi);

        let sensor = self
            .power_cycle()?
            .power_up()?
            .enable_srom_download()?
            .load_srom()?
            .configure(dpi)?
            .settle();

        info!("PMW3389 operational");
        Ok(sensor)
    }

    /// Shut the chip down and reset the serial port.
    pub fn power_cycle(mut self) -> Result<Pmw3389<T, D, Reset>, Error<E>> {
        // Let any earlier transaction settle with NCS high
        self.bus.deselect()?;
        self.bus.delay_ms(timing::IDLE_MS);

        self.bus
            .write(register::SHUTDOWN, register::SHUTDOWN_CODE)?;
        self.bus.delay_ms(timing::SHUTDOWN_MS);

        // NCS pulse resets the SPI port independently of the shutdown
        self.bus.select()?;
        self.bus.delay_ms(timing::NCS_PULSE_MS);
        self.bus.deselect()?;
        self.bus.delay_ms(timing::NCS_PULSE_MS);

        Ok(self.into_stage())
    }
}

impl<T, D, E> Pmw3389<T, D, Reset>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// Reboot the chip and clear its motion latch.
    pub fn power_up(mut self) -> Result<Pmw3389<T, D, PoweredUp>, Error<E>> {
        self.bus
            .write(register::POWER_UP_RESET, register::POWER_UP_RESET_CODE)?;
        self.bus.delay_ms(timing::POWER_UP_RESET_MS);

        // Values are meaningless, the reads themselves clear the latch
        for addr in register::POST_RESET_LATCH {
            self.bus.read(addr)?;
        }

        Ok(self.into_stage())
    }
}

impl<T, D, E> Pmw3389<T, D, PoweredUp>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// Put the chip in SROM download mode. The two SROM_ENABLE writes
    /// have to be at least 10ms apart.
    pub fn enable_srom_download(mut self) -> Result<Pmw3389<T, D, SromLoading>, Error<E>> {
        self.bus
            .write(register::CONFIG2, register::CONFIG2_SROM_DOWNLOAD)?;
        self.bus
            .write(register::SROM_ENABLE, register::SROM_ENABLE_START)?;
        self.bus.delay_ms(timing::SROM_ENABLE_MS);
        self.bus
            .write(register::SROM_ENABLE, register::SROM_ENABLE_CONFIRM)?;

        Ok(self.into_stage())
    }
}

impl<T, D, E> Pmw3389<T, D, SromLoading>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// Upload the firmware and wait for the chip to commit it.
    pub fn load_srom(mut self) -> Result<Pmw3389<T, D, SromLoaded>, Error<E>> {
        srom::load_srom(&mut self.bus, self.firmware)?;
        self.bus.delay_ms(timing::SROM_COMMIT_MS);

        Ok(self.into_stage())
    }
}

impl<T, D, E> Pmw3389<T, D, SromLoaded>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// Write the configuration registers. Only the resolution write
    /// depends on `dpi`.
    pub fn configure(mut self, dpi: u8) -> Result<Pmw3389<T, D, Configured>, Error<E>> {
        let config = self.config;

        self.bus
            .write(register::CONFIG2, register::CONFIG2_REST_DISABLED)?;
        self.bus.write(register::ANGLE_TUNE, config.angle_tune)?;
        self.bus
            .write(register::ANGLE_SNAP, config.angle_snap_bits())?;
        self.bus.write(register::RESOLUTION_H, dpi)?;
        self.bus
            .write(register::LIFT_CONFIG, config.lift_cutoff as u8)?;
        self.bus
            .write(register::MIN_SQ_RUN, config.min_squal_run)?;
        self.bus
            .write(register::RAW_DATA_THRESHOLD, config.raw_data_threshold)?;

        Ok(self.into_stage())
    }
}

impl<T, D, E> Pmw3389<T, D, Configured>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// Wait out the configuration before the first motion read.
    pub fn settle(mut self) -> Pmw3389<T, D, Operational> {
        self.bus.delay_ms(timing::CONFIGURATION_MS);
        self.into_stage()
    }
}

impl<T, D, E> Pmw3389<T, D, Operational>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    /// Raw register value. Polling cadence is up to the caller.
    pub fn read_register(&mut self, addr: u8) -> Result<u8, Error<E>> {
        self.bus.read(addr)
    }

    /// Product and revision ID, as read back from the chip.
    pub fn product_info(&mut self) -> Result<ProductInfo, Error<E>> {
        Ok(ProductInfo {
            product_id: self.bus.read(register::PRODUCT_ID)?,
            revision_id: self.bus.read(register::REVISION_ID)?,
        })
    }

    /// Check that a PMW3389 answers on the bus.
    pub fn verify_product(&mut self) -> Result<(), Error<E>> {
        let product_id = self.bus.read(register::PRODUCT_ID)?;
        let inverse_product_id = self.bus.read(register::INVERSE_PRODUCT_ID)?;

        if product_id == register::EXPECTED_PRODUCT_ID
            && inverse_product_id == register::EXPECTED_INVERSE_PRODUCT_ID
        {
            Ok(())
        } else {
            Err(Error::UnexpectedProduct {
                product_id,
                inverse_product_id,
            })
        }
    }

    /// Version of the running firmware, 0 if the upload did not take.
    pub fn srom_id(&mut self) -> Result<u8, Error<E>> {
        self.bus.read(register::SROM_ID)
    }

    /// Reading this latches the delta registers.
    pub fn motion_status(&mut self) -> Result<MotionStatus, Error<E>> {
        let motion = self.bus.read(register::MOTION)?;
        Ok(MotionStatus::from_bits_retain(motion))
    }

    /// Power the chip down. It needs a full [Pmw3389::initialize] to come
    /// back, the SROM is lost.
    pub fn shutdown(mut self) -> Result<Pmw3389<T, D, Unpowered>, Error<E>> {
        self.bus
            .write(register::SHUTDOWN, register::SHUTDOWN_CODE)?;
        self.bus.delay_ms(timing::SHUTDOWN_MS);
        Ok(self.into_stage())
    }
}
