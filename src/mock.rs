//! Recording bus and delay used by the unit tests.

use std::{cell::RefCell, fmt, rc::Rc, vec::Vec};

use embedded_hal::delay::DelayNs;

use crate::{
    register,
    transport::{BusClock, Transport},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    Transfer { tx: Vec<u8>, rx_len: usize },
    Clock(BusClock),
    DelayNs(u32),
    DelayUs(u32),
    DelayMs(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockError;

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock transfer failure")
    }
}

struct Device {
    registers: [u8; 128],
    events: Vec<Event>,
    selected: bool,
    // Address byte of the current chip-select window, if any
    command: Option<u8>,
    transfers_left: Option<usize>,
}

/// Register-file sensor model. Clones share the same device.
#[derive(Clone)]
pub struct MockTransport {
    device: Rc<RefCell<Device>>,
}

pub struct MockDelay {
    device: Rc<RefCell<Device>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            device: Rc::new(RefCell::new(Device {
                registers: [0; 128],
                events: Vec::new(),
                selected: false,
                command: None,
                transfers_left: None,
            })),
        }
    }

    /// A delay that records into the same event log.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            device: self.device.clone(),
        }
    }

    pub fn fill(&self, value: u8) {
        self.device.borrow_mut().registers = [value; 128];
    }

    pub fn set_register(&self, addr: u8, value: u8) {
        self.device.borrow_mut().registers[addr as usize] = value;
    }

    pub fn register(&self, addr: u8) -> u8 {
        self.device.borrow().registers[addr as usize]
    }

    /// Let `count` more transfers succeed, fail every one after that.
    pub fn fail_transfers_after(&self, count: usize) {
        self.device.borrow_mut().transfers_left = Some(count);
    }

    pub fn events(&self) -> Vec<Event> {
        self.device.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.device.borrow_mut().events.clear();
    }

    pub fn is_selected(&self) -> bool {
        self.device.borrow().selected
    }

    /// Every byte clocked out, grouped by chip-select window.
    pub fn select_windows(&self) -> Vec<Vec<u8>> {
        let mut windows = Vec::new();
        let mut current: Option<Vec<u8>> = None;
        for event in self.device.borrow().events.iter() {
            match event {
                Event::Select => current = Some(Vec::new()),
                Event::Deselect => {
                    if let Some(window) = current.take() {
                        windows.push(window);
                    }
                }
                Event::Transfer { tx, .. } => {
                    if let Some(window) = current.as_mut() {
                        window.extend_from_slice(tx);
                    }
                }
                _ => {}
            }
        }
        windows
    }

    /// `(address, value)` of every single-register write, in order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.select_windows()
            .into_iter()
            .filter(|w| w.len() == 2 && w[0] & register::WRITE_BIT != 0)
            .map(|w| (w[0] & !register::WRITE_BIT, w[1]))
            .collect()
    }

    /// Addresses of every single-register read, in order.
    pub fn reads(&self) -> Vec<u8> {
        self.select_windows()
            .into_iter()
            .filter(|w| w.len() == 1 && w[0] & register::WRITE_BIT == 0)
            .map(|w| w[0])
            .collect()
    }

    /// Sum of all delays, in microseconds, recorded so far.
    pub fn delayed_us(&self) -> u64 {
        self.device
            .borrow()
            .events
            .iter()
            .map(|e| match e {
                Event::DelayNs(ns) => *ns as u64 / 1000,
                Event::DelayUs(us) => *us as u64,
                Event::DelayMs(ms) => *ms as u64 * 1000,
                _ => 0,
            })
            .sum()
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn assert_select(&mut self) -> Result<(), MockError> {
        let mut device = self.device.borrow_mut();
        device.events.push(Event::Select);
        device.selected = true;
        device.command = None;
        Ok(())
    }

    fn deassert_select(&mut self) -> Result<(), MockError> {
        let mut device = self.device.borrow_mut();
        device.events.push(Event::Deselect);
        device.selected = false;
        device.command = None;
        Ok(())
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), MockError> {
        let mut guard = self.device.borrow_mut();
        let device = &mut *guard;

        // A failed transfer never reaches the wire
        if let Some(left) = device.transfers_left {
            if left == 0 {
                return Err(MockError);
            }
            device.transfers_left = Some(left - 1);
        }

        device.events.push(Event::Transfer {
            tx: tx.to_vec(),
            rx_len: rx.len(),
        });

        if !device.selected {
            // The chip ignores the bus while NCS is high
            rx.fill(0);
            return Ok(());
        }

        for &byte in tx {
            match device.command {
                None => device.command = Some(byte),
                Some(command) if command & register::WRITE_BIT != 0 => {
                    let addr = (command & !register::WRITE_BIT) as usize;
                    device.registers[addr] = byte;
                }
                Some(_) => {}
            }
        }

        let value = match device.command {
            Some(command) if command & register::WRITE_BIT == 0 => {
                device.registers[command as usize]
            }
            _ => 0,
        };
        rx.fill(value);

        Ok(())
    }

    fn set_clock(&mut self, clock: BusClock) -> Result<(), MockError> {
        self.device.borrow_mut().events.push(Event::Clock(clock));
        Ok(())
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.device.borrow_mut().events.push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.device.borrow_mut().events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.device.borrow_mut().events.push(Event::DelayMs(ms));
    }
}
