//! AT command options
//!
//! Registers that control how the device enters and leaves command mode.
//! The driver reads both on connect so that its own timeout bookkeeping
//! matches what the device actually does.

use super::TimingRegister;
use crate::commands::AtCommand;

/// Command mode timeout register (`CT`)
///
/// Period of inactivity (no valid command received) after which the device
/// leaves command mode on its own and returns to transparent mode.
///
/// Units of 100 ms.
///
/// # Important Notes
/// - Range: `0x02..=0x028F` (200 ms to 65.5 s)
/// - Default: `0x64` (10 s)
/// - The device gives no notice when the timeout expires
pub const COMMAND_MODE_TIMEOUT: TimingRegister = TimingRegister {
    command: AtCommand::from_bytes(*b"CT"),
    unit_ms: 100,
    min_raw: 0x0002,
    max_raw: 0x028F,
};

/// Guard time register (`GT`)
///
/// Required silence before and after the escape sequence. The silence keeps
/// ordinary payload data containing `+++` from switching the device into
/// command mode.
///
/// Units of 1 ms.
///
/// # Important Notes
/// - Range: `0x01..=0x0CE4` (1 ms to 3.3 s)
/// - Default: `0x3E8` (1 s)
/// - A longer guard time directly lengthens every mode entry
pub const GUARD_TIME: TimingRegister = TimingRegister {
    command: AtCommand::from_bytes(*b"GT"),
    unit_ms: 1,
    min_raw: 0x0001,
    max_raw: 0x0CE4,
};
