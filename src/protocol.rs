use embedded_hal::delay::DelayNs;
use log::trace;

use crate::{
    register,
    transport::{BusClock, Transport},
    Error,
};

/// Single-register framing on top of a [Transport].
///
/// Every transaction holds chip-select low from its first to its last
/// byte and releases it before returning, on the error path too.
/// Transactions cannot interleave since this owns the transport.
pub(crate) struct RegisterBus<T, D> {
    transport: T,
    delay: D,
    read_address_wait_us: u32,
}

impl<T, D, E> RegisterBus<T, D>
where
    T: Transport<Error = E>,
    D: DelayNs,
{
    pub(crate) fn new(transport: T, delay: D, read_address_wait_us: u32) -> Self {
        RegisterBus {
            transport,
            delay,
            read_address_wait_us,
        }
    }

    /// Address phase, optional wait, one-byte data phase.
    pub(crate) fn read(&mut self, addr: u8) -> Result<u8, Error<E>> {
        check_address(addr)?;

        let mut data = [0u8; 1];
        let wait_us = self.read_address_wait_us;
        self.transaction(|transport, delay| {
            transport.transfer(&[addr], &mut [])?;
            if wait_us > 0 {
                delay.delay_us(wait_us);
            }
            transport.transfer(&[], &mut data)
        })?;

        trace!("read {:#04x} -> {:#04x}", addr, data[0]);
        Ok(data[0])
    }

    /// Address (with the write bit) and value in one transfer.
    pub(crate) fn write(&mut self, addr: u8, value: u8) -> Result<(), Error<E>> {
        check_address(addr)?;

        self.transaction(|transport, _| {
            transport.transfer(&[addr | register::WRITE_BIT, value], &mut [])
        })?;

        trace!("write {:#04x} <- {:#04x}", addr, value);
        Ok(())
    }

    /// Address byte followed by all of `data` inside a single
    /// chip-select window.
    pub(crate) fn burst_write(&mut self, addr: u8, data: &[u8]) -> Result<(), Error<E>> {
        check_address(addr)?;

        self.transaction(|transport, _| {
            transport.transfer(&[addr | register::WRITE_BIT], &mut [])?;
            transport.transfer(data, &mut [])
        })?;

        trace!("burst {:#04x} <- {} bytes", addr, data.len());
        Ok(())
    }

    pub(crate) fn set_clock(&mut self, clock: BusClock) -> Result<(), Error<E>> {
        self.transport.set_clock(clock)?;
        Ok(())
    }

    pub(crate) fn select(&mut self) -> Result<(), Error<E>> {
        self.transport.assert_select()?;
        Ok(())
    }

    pub(crate) fn deselect(&mut self) -> Result<(), Error<E>> {
        self.transport.deassert_select()?;
        Ok(())
    }

    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub(crate) fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    fn transaction<F>(&mut self, f: F) -> Result<(), Error<E>>
    where
        F: FnOnce(&mut T, &mut D) -> Result<(), E>,
    {
        self.transport.assert_select()?;
        let result = f(&mut self.transport, &mut self.delay);
        // Always give the line back, but report the transfer error first
        let released = self.transport.deassert_select();
        result?;
        released?;
        Ok(())
    }
}

fn check_address<E>(addr: u8) -> Result<(), Error<E>> {
    if addr > register::MAX_ADDRESS {
        Err(Error::InvalidAddress(addr))
    } else {
        Ok(())
    }
}
