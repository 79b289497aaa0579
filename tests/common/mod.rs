//! Simulated XBee radio for driving the session engine without hardware.
//!
//! [`Radio`] holds the state of one simulated module behind shared handles,
//! so a test can hand the transport, clock and reset pin to a [`Device`] and
//! still inspect or disturb the module afterwards. The simulation models:
//!
//! - the module's own baud rate; bytes sent at any other rate are ignored
//! - command mode entry on `+++` after `GT` of silence, and its expiry after
//!   `GT` + `CT`
//! - numeric and text registers, including the `CT`/`GT` ranges
//! - `AC`, `WR`, `CN` and the `BD` rate switch on apply
//! - faults: dropped frames, a mute module, a stuck register

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use xbee_at::{
    Clock, Device, DriverConfig, Transport, TransportError, NON_STANDARD_BAUD_MIN,
    STANDARD_BAUD_RATES,
};

pub type SimDevice = Device<SimTransport, MockPin, MockClock>;

/// A register as stored by the simulated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Register {
    Numeric(u32),
    Text(String),
}

#[derive(Debug)]
pub struct RadioState {
    /// Rate the module listens at
    pub device_baud: u32,
    /// Rate the host transport is set to
    pub host_baud: Option<u32>,
    pub command_mode: bool,
    pub deadline_ms: u64,
    pub registers: BTreeMap<String, Register>,
    pub pending_baud: Option<u32>,
    /// Registers whose reads always answer this value
    pub stuck: BTreeMap<String, u32>,
    /// Command frames to swallow, dropping out of command mode each time
    pub drop_next: usize,
    /// Stop answering anything once a frame has been swallowed
    pub deaf_after_drop: bool,
    /// Never answer anything
    pub mute: bool,
    /// Answer the escape sequence with these bytes instead of `OK\r`
    pub escape_reply: Option<Vec<u8>>,
    pub escapes: usize,
    /// Time of the last byte written by the host
    pub last_write_ms: Option<u64>,
    pub frames: Vec<String>,
    pub baud_changes: Vec<u32>,
    pub saves: usize,
    pub rx: VecDeque<Vec<u8>>,
}

impl RadioState {
    fn new(device_baud: u32) -> Self {
        let registers = [
            ("GT", Register::Numeric(0x3E8)),
            ("CT", Register::Numeric(0x64)),
            ("VR", Register::Numeric(0x2270)),
            ("HV", Register::Numeric(0x1A45)),
            ("ID", Register::Numeric(0x3332)),
            ("NI", Register::Text(String::from(" "))),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

        Self {
            device_baud,
            host_baud: None,
            command_mode: false,
            deadline_ms: 0,
            registers,
            pending_baud: None,
            stuck: BTreeMap::new(),
            drop_next: 0,
            deaf_after_drop: false,
            mute: false,
            escape_reply: None,
            escapes: 0,
            last_write_ms: None,
            frames: Vec::new(),
            baud_changes: Vec::new(),
            saves: 0,
            rx: VecDeque::new(),
        }
    }

    fn numeric(&self, name: &str) -> u32 {
        match self.registers.get(name) {
            Some(Register::Numeric(value)) => *value,
            _ => 0,
        }
    }

    fn guard_ms(&self) -> u64 {
        u64::from(self.numeric("GT"))
    }

    fn timeout_ms(&self) -> u64 {
        u64::from(self.numeric("CT")) * 100
    }

    fn hears_host(&self) -> bool {
        !self.mute && self.host_baud == Some(self.device_baud)
    }

    fn on_write(&mut self, bytes: &[u8], now_ms: u64) {
        let quiet_ms = self
            .last_write_ms
            .map_or(u64::MAX, |last| now_ms.saturating_sub(last));
        self.last_write_ms = Some(now_ms);

        if bytes == b"+++" {
            self.escapes += 1;
            // Without leading silence the escape is just payload data
            if !self.hears_host() || quiet_ms < self.guard_ms() {
                return;
            }
            if let Some(reply) = self.escape_reply.clone() {
                self.rx.push_back(reply);
                return;
            }
            // OK is sent once the trailing guard time has passed
            self.command_mode = true;
            self.deadline_ms = now_ms + self.guard_ms() + self.timeout_ms();
            self.rx.push_back(b"OK\r".to_vec());
            return;
        }

        let text = String::from_utf8_lossy(bytes)
            .trim_end_matches('\r')
            .to_string();
        self.frames.push(text.clone());

        if !self.hears_host() {
            return;
        }
        if !self.command_mode || now_ms >= self.deadline_ms {
            // Transparent mode: the frame goes out over the air
            self.command_mode = false;
            return;
        }
        if self.drop_next > 0 {
            self.drop_next -= 1;
            self.command_mode = false;
            if self.deaf_after_drop {
                self.mute = true;
            }
            return;
        }

        self.deadline_ms = now_ms + self.timeout_ms();
        let reply = self.execute(&text);
        self.rx.push_back(format!("{reply}\r").into_bytes());
    }

    fn execute(&mut self, frame: &str) -> String {
        let Some(body) = frame.strip_prefix("AT") else {
            return "ERROR".into();
        };
        if body.len() < 2 || !body.is_char_boundary(2) {
            return "ERROR".into();
        }
        let (name, rest) = body.split_at(2);
        let arg = rest.strip_prefix(' ');

        match (name, arg) {
            ("AC", None) => {
                self.apply();
                "OK".into()
            }
            ("WR", None) => {
                self.saves += 1;
                "OK".into()
            }
            ("CN", None) => {
                self.apply();
                self.command_mode = false;
                "OK".into()
            }
            ("BD", None) => {
                let raw = STANDARD_BAUD_RATES
                    .iter()
                    .position(|&rate| rate == self.device_baud)
                    .map_or(self.device_baud, |index| index as u32);
                format!("{raw:X}")
            }
            ("BD", Some(arg)) => match u32::from_str_radix(arg, 16) {
                Ok(raw) if (raw as usize) < STANDARD_BAUD_RATES.len() => {
                    self.pending_baud = Some(STANDARD_BAUD_RATES[raw as usize]);
                    "OK".into()
                }
                Ok(raw) if raw >= NON_STANDARD_BAUD_MIN => {
                    self.pending_baud = Some(raw);
                    "OK".into()
                }
                _ => "ERROR".into(),
            },
            (name, None) => {
                if let Some(value) = self.stuck.get(name) {
                    return format!("{value:X}");
                }
                match self.registers.get(name) {
                    Some(Register::Numeric(value)) => format!("{value:X}"),
                    Some(Register::Text(text)) => text.clone(),
                    None => "ERROR".into(),
                }
            }
            (name, Some(arg)) => match self.registers.get(name) {
                Some(Register::Numeric(_)) => match u32::from_str_radix(arg, 16) {
                    Ok(value) if in_range(name, value) => {
                        self.registers
                            .insert(name.to_string(), Register::Numeric(value));
                        "OK".into()
                    }
                    _ => "ERROR".into(),
                },
                Some(Register::Text(_)) => {
                    self.registers
                        .insert(name.to_string(), Register::Text(arg.to_string()));
                    "OK".into()
                }
                None => "ERROR".into(),
            },
        }
    }

    fn apply(&mut self) {
        if let Some(baud) = self.pending_baud.take() {
            self.device_baud = baud;
        }
    }
}

fn in_range(name: &str, value: u32) -> bool {
    match name {
        "CT" => (0x02..=0x28F).contains(&value),
        "GT" => (0x01..=0xCE4).contains(&value),
        _ => true,
    }
}

/// Shared handles onto one simulated module, its clock and its reset line.
#[derive(Clone)]
pub struct Radio {
    pub state: Rc<RefCell<RadioState>>,
    nanos: Rc<Cell<u64>>,
    pin_states: Rc<RefCell<Vec<bool>>>,
}

impl Radio {
    pub fn new(device_baud: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(RadioState::new(device_baud))),
            nanos: Rc::new(Cell::new(0)),
            pin_states: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn device(&self) -> SimDevice {
        self.device_with(DriverConfig::default())
    }

    pub fn device_with(&self, config: DriverConfig) -> SimDevice {
        Device::new(
            SimTransport { radio: self.clone() },
            MockPin {
                states: self.pin_states.clone(),
            },
            MockClock {
                nanos: self.nanos.clone(),
            },
            config,
        )
    }

    /// A device that has completed `connect` at the module's own rate.
    pub fn connected_device(&self) -> SimDevice {
        let mut device = self.device();
        let baud = self.state.borrow().device_baud;
        assert_eq!(device.connect(baud), Ok(baud));
        device
    }

    pub fn now_ms(&self) -> u64 {
        self.nanos.get() / 1_000_000
    }

    pub fn advance_ms(&self, ms: u64) {
        self.nanos.set(self.nanos.get() + ms * 1_000_000);
    }

    pub fn escapes(&self) -> usize {
        self.state.borrow().escapes
    }

    pub fn frames(&self) -> Vec<String> {
        self.state.borrow().frames.clone()
    }

    pub fn baud_changes(&self) -> Vec<u32> {
        self.state.borrow().baud_changes.clone()
    }

    pub fn pin_states(&self) -> Vec<bool> {
        self.pin_states.borrow().clone()
    }

    pub fn register(&self, name: &str) -> Option<Register> {
        self.state.borrow().registers.get(name).cloned()
    }

    pub fn set_register(&self, name: &str, value: Register) {
        self.state
            .borrow_mut()
            .registers
            .insert(name.to_string(), value);
    }
}

pub struct SimTransport {
    radio: Radio,
}

impl Transport for SimTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let now = self.radio.now_ms();
        self.radio.state.borrow_mut().on_write(bytes, now);
        Ok(())
    }

    fn has_data(&mut self) -> bool {
        !self.radio.state.borrow().rx.is_empty()
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let frame = self
            .radio
            .state
            .borrow_mut()
            .rx
            .pop_front()
            .ok_or(TransportError::Other)?;

        if frame.len() > buf.len() {
            return Err(TransportError::Overrun);
        }
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(frame.len())
    }

    fn set_baud(&mut self, baud: u32) -> Result<(), TransportError> {
        let mut state = self.radio.state.borrow_mut();
        state.host_baud = Some(baud);
        state.baud_changes.push(baud);
        Ok(())
    }
}

/// Millisecond clock that only moves when the driver sleeps or the test
/// advances it.
pub struct MockClock {
    nanos: Rc<Cell<u64>>,
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        self.nanos.set(self.nanos.get() + u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.nanos.set(self.nanos.get() + u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.nanos.set(self.nanos.get() + u64::from(ms) * 1_000_000);
    }
}

impl Clock for MockClock {
    fn now_ms(&mut self) -> u64 {
        self.nanos.get() / 1_000_000
    }
}

/// Reset line that records every level it is driven to.
pub struct MockPin {
    states: Rc<RefCell<Vec<bool>>>,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.states.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.states.borrow_mut().push(true);
        Ok(())
    }
}
