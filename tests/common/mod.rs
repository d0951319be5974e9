//! Shared test doubles: an in-memory nPM1300 register file and a recording delay.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use npm1300_rs::registers::addr;
use npm1300_rs::{Npm1300, RegisterAddress, RegisterInterface};

/// One observable interaction with the fake device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write(RegisterAddress, u8),
    Read(RegisterAddress),
    DelayMs(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

#[derive(Default)]
pub struct State {
    pub regs: HashMap<RegisterAddress, u8>,
    pub log: Vec<Event>,
    pub charger_enabled: bool,
    /// Charge-current register writes observed while the charger was enabled.
    pub iset_writes_while_enabled: usize,
    pub fail_reads: bool,
    pub fail_writes_to: Option<RegisterAddress>,
}

/// Register file shared between the driver and the test body.
#[derive(Clone, Default)]
pub struct FakePmic {
    state: Rc<RefCell<State>>,
}

impl FakePmic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, reg: RegisterAddress, value: u8) {
        self.state.borrow_mut().regs.insert(reg, value);
    }

    pub fn get(&self, reg: RegisterAddress) -> u8 {
        self.state.borrow().regs.get(&reg).copied().unwrap_or(0)
    }

    pub fn log(&self) -> Vec<Event> {
        self.state.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    pub fn writes(&self) -> Vec<(RegisterAddress, u8)> {
        self.log()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(reg, value) => Some((reg, value)),
                _ => None,
            })
            .collect()
    }

    pub fn charger_enabled(&self) -> bool {
        self.state.borrow().charger_enabled
    }

    pub fn iset_writes_while_enabled(&self) -> usize {
        self.state.borrow().iset_writes_while_enabled
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn fail_writes_to(&self, reg: Option<RegisterAddress>) {
        self.state.borrow_mut().fail_writes_to = reg;
    }

    pub fn delay(&self) -> RecordingDelay {
        RecordingDelay {
            state: self.state.clone(),
        }
    }
}

impl RegisterInterface for FakePmic {
    type Error = FakeBusError;

    fn write_register(&mut self, address: RegisterAddress, value: u8) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes_to == Some(address) {
            return Err(FakeBusError);
        }
        state.log.push(Event::Write(address, value));
        if address == addr::charger::ENABLE_SET && value & 1 != 0 {
            state.charger_enabled = true;
        } else if address == addr::charger::ENABLE_CLR && value & 1 != 0 {
            state.charger_enabled = false;
        } else if (address == addr::charger::ISET_MSB || address == addr::charger::ISET_LSB)
            && state.charger_enabled
        {
            state.iset_writes_while_enabled += 1;
        }
        state.regs.insert(address, value);
        Ok(())
    }

    fn read_register(&mut self, address: RegisterAddress) -> Result<u8, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_reads {
            return Err(FakeBusError);
        }
        state.log.push(Event::Read(address));
        if address == addr::charger::ENABLE_SET {
            return Ok(state.charger_enabled as u8);
        }
        Ok(state.regs.get(&address).copied().unwrap_or(0))
    }

    fn read_registers(&mut self, address: RegisterAddress, buf: &mut [u8]) -> Result<(), Self::Error> {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_register(address.offset_by(i as u8))?;
        }
        Ok(())
    }

    fn write_registers(&mut self, address: RegisterAddress, data: &[u8]) -> Result<(), Self::Error> {
        for (i, byte) in data.iter().enumerate() {
            self.write_register(address.offset_by(i as u8), *byte)?;
        }
        Ok(())
    }
}

/// Delay that records requested milliseconds in the shared event log.
pub struct RecordingDelay {
    state: Rc<RefCell<State>>,
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_us(&mut self, _us: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.state.borrow_mut().log.push(Event::DelayMs(ms));
    }
}

/// No-op delay for scripted I2C tests.
#[derive(Debug, Clone, Copy)]
pub struct NoopDelay;

impl embedded_hal::delay::DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Driver over a fresh fake device; the returned handle shares its state.
pub fn fake_driver() -> (Npm1300<FakePmic, RecordingDelay>, FakePmic) {
    let fake = FakePmic::new();
    let driver = Npm1300::new(fake.clone(), fake.delay());
    (driver, fake)
}
