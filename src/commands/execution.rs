//! Execution commands
//!
//! These commands carry no value. Each answers `OK` on success.

use super::AtCommand;

/// Apply changes (`AC`)
///
/// Applies every register written since the last apply or exit.
///
/// # Important Notes
/// - Written registers are queued by the device until `AC` or `CN`
/// - Does not persist anything; see [`WRITE_NONVOLATILE`]
pub const APPLY_CHANGES: AtCommand = AtCommand::from_bytes(*b"AC");

/// Write (`WR`)
///
/// Stores the current register values in non-volatile memory so they
/// survive a reset or power cycle.
///
/// # Important Notes
/// - Flash endurance is limited; avoid writing on every boot
/// - The device should not be reset until `OK` is received
pub const WRITE_NONVOLATILE: AtCommand = AtCommand::from_bytes(*b"WR");

/// Exit command mode (`CN`)
///
/// Explicitly returns the device to transparent mode. Queued register
/// changes are applied on exit.
pub const EXIT_COMMAND_MODE: AtCommand = AtCommand::from_bytes(*b"CN");
