//! Diagnostic commands
//!
//! Read-only identification of the attached module. Both values are returned
//! by the device as up to four hexadecimal digits.

use super::AtCommand;

/// Firmware version (`VR`)
///
/// Four hex digits `ABCD`: `ABC` is the main release number and `D` the
/// revision. `B` is a variant designator.
///
/// # Important Notes
/// - ZB firmware reports `0x2xxx`, ZNet firmware reports `0x1xxx`
/// - ZNet firmware is not compatible with ZB firmware
/// - Also used as the liveness probe, since any answer proves command mode
pub const FIRMWARE_VERSION: AtCommand = AtCommand::from_bytes(*b"VR");

/// Hardware version (`HV`)
///
/// The upper byte identifies the module type, the lower byte its revision.
pub const HARDWARE_VERSION: AtCommand = AtCommand::from_bytes(*b"HV");

/// Firmware function set, decoded from the top nibble of `VR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareFamily {
    /// ZNet 2.5 firmware (`0x1xxx`)
    ZNet,
    /// ZigBee (ZB) firmware (`0x2xxx`)
    ZigBee,
    /// Anything else
    Other(u8),
}

/// Module type, decoded from the upper byte of `HV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareKind {
    /// Standard XBee module (`0x19xx`)
    XBee,
    /// XBee-PRO module (`0x1Axx`)
    XBeePro,
    /// Anything else
    Other(u8),
}

/// Firmware and hardware identification of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    /// Raw `VR` value
    pub firmware: u16,
    /// Raw `HV` value
    pub hardware: u16,
}

impl Version {
    /// Firmware function set.
    pub const fn firmware_family(&self) -> FirmwareFamily {
        match self.firmware >> 12 {
            0x1 => FirmwareFamily::ZNet,
            0x2 => FirmwareFamily::ZigBee,
            other => FirmwareFamily::Other(other as u8),
        }
    }

    /// Module type.
    pub const fn hardware_kind(&self) -> HardwareKind {
        match (self.hardware >> 8) as u8 {
            0x19 => HardwareKind::XBee,
            0x1A => HardwareKind::XBeePro,
            other => HardwareKind::Other(other),
        }
    }

    /// Hardware revision (lower byte of `HV`).
    pub const fn hardware_revision(&self) -> u8 {
        self.hardware as u8
    }
}
