//! Register definitions for the XBee AT command set
//!
//! Registers are read by sending the bare command token and written by
//! appending a value. Numeric values travel as hexadecimal text; this module
//! holds the unit conversions and legal ranges needed to turn them into
//! milliseconds or baud rates.
//!
//! Only the registers the session engine itself depends on are described
//! here. Any other register can still be accessed through
//! [`Device::read_numeric`](crate::Device::read_numeric) and friends with an
//! [`AtCommand`](crate::AtCommand) built at the call site.

use bitflags::bitflags;

use crate::commands::AtCommand;

mod interface;
mod options;

pub use interface::*;
pub use options::*;

bitflags! {
    /// Registers written since the last apply or persist.
    ///
    /// The device queues written values until `AC` (or `CN`) applies them,
    /// and keeps them only in RAM until `WR` stores them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PendingChanges: u8 {
        /// Command mode timeout (`CT`)
        const COMMAND_MODE_TIMEOUT = 1 << 0;
        /// Guard time (`GT`)
        const GUARD_TIME = 1 << 1;
        /// Interface data rate (`BD`)
        const BAUD_RATE = 1 << 2;
        /// Any register not listed above
        const OTHER = 1 << 7;
    }
}

impl PendingChanges {
    /// The flag recorded when `command` is written.
    pub fn for_command(command: AtCommand) -> Self {
        if command == COMMAND_MODE_TIMEOUT.command {
            Self::COMMAND_MODE_TIMEOUT
        } else if command == GUARD_TIME.command {
            Self::GUARD_TIME
        } else if command == BAUD_RATE {
            Self::BAUD_RATE
        } else {
            Self::OTHER
        }
    }
}

/// A numeric register holding a duration.
///
/// The device stores `raw` units of `unit_ms` milliseconds each and only
/// accepts raw values in `min_raw..=max_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingRegister {
    /// Command token used to read and write the register
    pub command: AtCommand,
    /// Milliseconds per raw unit
    pub unit_ms: u32,
    /// Smallest accepted raw value
    pub min_raw: u32,
    /// Largest accepted raw value
    pub max_raw: u32,
}

impl TimingRegister {
    /// Converts milliseconds to the raw register value, clamped to the
    /// accepted range.
    pub const fn to_raw(&self, ms: u32) -> u32 {
        let raw = ms / self.unit_ms;
        if raw < self.min_raw {
            self.min_raw
        } else if raw > self.max_raw {
            self.max_raw
        } else {
            raw
        }
    }

    /// Converts a raw register value to milliseconds.
    pub const fn to_ms(&self, raw: u32) -> u32 {
        raw.saturating_mul(self.unit_ms)
    }

    /// Smallest duration the register can hold.
    pub const fn min_ms(&self) -> u32 {
        self.to_ms(self.min_raw)
    }

    /// Largest duration the register can hold.
    pub const fn max_ms(&self) -> u32 {
        self.to_ms(self.max_raw)
    }
}
