use embedded_hal::delay::DelayNs;
use log::debug;

use crate::{
    protocol::RegisterBus,
    register,
    transport::{BusClock, Transport},
    Error,
};

/// Stream the firmware image into the sensor's program memory.
///
/// The device must already be in SROM download mode. The whole image goes
/// out behind a single chip-select assertion at [BusClock::SromDownload];
/// the load counter only advances while NCS is low, so the burst cannot be
/// split. Nothing on the bus confirms the load, check `SROM_ID` afterwards.
///
/// The caller has to leave the bus idle for 15ms afterwards.
pub(crate) fn load_srom<T, D, E>(bus: &mut RegisterBus<T, D>, image: &[u8]) -> Result<(), Error<E>>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    if image.is_empty() {
        return Err(Error::EmptyFirmware);
    }

    debug!("uploading {} byte SROM", image.len());

    bus.set_clock(BusClock::SromDownload)?;
    let burst = bus.burst_write(register::SROM_LOAD_BURST, image);
    let restored = bus.set_clock(BusClock::Standard);
    burst?;
    restored?;

    Ok(())
}
