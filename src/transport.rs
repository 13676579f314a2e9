use embedded_hal::{digital::OutputPin, spi::SpiBus};

/// Clock rate requested from the transport.
///
/// The SROM may be clocked faster than steady-state register access,
/// transports that cannot change their rate can ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusClock {
    Standard,
    SromDownload,
}

/// Raw access to the serial bus the sensor sits on.
///
/// The chip-select line is driven by the caller so that several transfers
/// can share one transaction. Implementations must not touch chip-select
/// from `transfer`.
pub trait Transport {
    type Error;

    /// Pull NCS low.
    fn assert_select(&mut self) -> Result<(), Self::Error>;

    /// Release NCS (high).
    fn deassert_select(&mut self) -> Result<(), Self::Error>;

    /// Clock out all of `tx`, then clock in `rx.len()` bytes.
    /// Either side may be empty.
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error>;

    fn set_clock(&mut self, _clock: BusClock) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn assert_select(&mut self) -> Result<(), Self::Error> {
        (**self).assert_select()
    }

    fn deassert_select(&mut self) -> Result<(), Self::Error> {
        (**self).deassert_select()
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error> {
        (**self).transfer(tx, rx)
    }

    fn set_clock(&mut self, clock: BusClock) -> Result<(), Self::Error> {
        (**self).set_clock(clock)
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiTransportError<S, P> {
    Spi(S),
    Select(P),
}

impl<S: core::fmt::Debug, P: core::fmt::Debug> core::fmt::Display for SpiTransportError<S, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SpiTransportError::Spi(e) => write!(f, "SPI error: {:?}", e),
            SpiTransportError::Select(e) => write!(f, "Chip-select error: {:?}", e),
        }
    }
}

/// [Transport] over an `embedded-hal` SPI bus with a manually driven
/// chip-select pin.
///
/// The bus has to be configured for SPI mode 3.
pub struct SpiTransport<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiTransport<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Takes ownership of the bus and idles chip-select high.
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, SpiTransportError<SPI::Error, CS::Error>> {
        cs.set_high().map_err(SpiTransportError::Select)?;
        Ok(SpiTransport { spi, cs })
    }

    /// Access to the bus for reconfiguration (e.g. its clock rate).
    pub fn bus_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Transport for SpiTransport<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = SpiTransportError<SPI::Error, CS::Error>;

    fn assert_select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(SpiTransportError::Select)
    }

    fn deassert_select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(SpiTransportError::Select)
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error> {
        if !tx.is_empty() {
            self.spi.write(tx).map_err(SpiTransportError::Spi)?;
        }
        if !rx.is_empty() {
            self.spi.read(rx).map_err(SpiTransportError::Spi)?;
        }
        // The caller may release chip-select right after this returns
        self.spi.flush().map_err(SpiTransportError::Spi)
    }
}
