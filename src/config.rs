//! Driver and device configuration
//!
//! Two kinds of settings exist:
//! - [`DriverConfig`] tunes the host side: timeouts, polling interval and
//!   the timing assumed before the device has been asked.
//! - [`DeviceConfig`] is the desired state of the device's own registers,
//!   written by [`Device::initialize`](crate::Device::initialize).

/// Time allowed for the `OK` after the escape sequence.
pub const DEFAULT_ENTER_TIMEOUT_MS: u32 = 2000;

/// Time allowed for the reply to a command frame.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 500;

/// Sleep between polls of the transport while waiting for a reply.
pub const DEFAULT_RECHECK_INTERVAL_MS: u32 = 10;

/// Settling time after power-up or a reset pulse.
pub const DEFAULT_STARTUP_DELAY_MS: u32 = 500;

/// Width of the reset pulse.
pub const DEFAULT_RESET_PULSE_MS: u32 = 10;

/// Factory default guard time (`GT` = `0x3E8`).
pub const FACTORY_GUARD_TIME_MS: u32 = 1000;

/// Factory default command mode timeout (`CT` = `0x64`).
pub const FACTORY_COMMAND_MODE_TIMEOUT_MS: u32 = 10_000;

/// Baud rates probed by discovery, in order.
pub const BAUD_LADDER: [u32; 8] = [
    9600, 19200, 38400, 57600, 115_200, 230_400, 460_800, 921_600,
];

/// How the driver decides whether the device is still in command mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LivenessCheck {
    /// Compare the time since the last entry with the command mode timeout.
    /// Costs no traffic.
    #[default]
    Clock,
    /// Send a firmware version read and treat any reply as proof. Useful
    /// when no reliable clock is available.
    ///
    /// If the device is actually in transparent mode the probe frame is
    /// transmitted over the air as data.
    Probe,
}

/// Host-side tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Time allowed for the `OK` after the escape sequence
    pub enter_timeout_ms: u32,
    /// Time allowed for the reply to a command frame
    pub response_timeout_ms: u32,
    /// Sleep between transport polls
    pub recheck_interval_ms: u32,
    /// Settling time after power-up or reset
    pub startup_delay_ms: u32,
    /// Width of the active-low reset pulse
    pub reset_pulse_ms: u32,
    /// Guard time assumed until read from the device
    pub guard_time_ms: u32,
    /// Command mode timeout assumed until read from the device
    pub command_mode_timeout_ms: u32,
    /// Command mode liveness strategy
    pub liveness: LivenessCheck,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            enter_timeout_ms: DEFAULT_ENTER_TIMEOUT_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            recheck_interval_ms: DEFAULT_RECHECK_INTERVAL_MS,
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            reset_pulse_ms: DEFAULT_RESET_PULSE_MS,
            guard_time_ms: FACTORY_GUARD_TIME_MS,
            command_mode_timeout_ms: FACTORY_COMMAND_MODE_TIMEOUT_MS,
            liveness: LivenessCheck::Clock,
        }
    }
}

/// Desired device register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Command mode timeout, clamped to 200..=65500 ms
    pub command_mode_timeout_ms: u32,
    /// Guard time, clamped to 1..=3300 ms
    pub guard_time_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            command_mode_timeout_ms: 6000,
            guard_time_ms: FACTORY_GUARD_TIME_MS,
        }
    }
}
