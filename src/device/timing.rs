//! Timing register synchronisation and execution commands

use embedded_hal::digital::OutputPin;

use super::{Device, Mode, Verify};
use crate::commands::{
    AtCommand, Version, APPLY_CHANGES, EXIT_COMMAND_MODE, FIRMWARE_VERSION, HARDWARE_VERSION,
    WRITE_NONVOLATILE,
};
use crate::registers::{PendingChanges, TimingRegister, COMMAND_MODE_TIMEOUT, GUARD_TIME};
use crate::transport::{Clock, Transport};
use crate::Error;

impl<T, R, C> Device<T, R, C>
where
    T: Transport,
    R: OutputPin,
    C: Clock,
{
    /// Reads the guard time and command mode timeout from the device and
    /// adopts them for the session.
    ///
    /// # Important Notes
    /// * `GT` is in milliseconds, `CT` in units of 100 ms
    /// * Values are taken as reported, even outside the documented ranges
    pub fn refresh_timing(&mut self) -> Result<(), Error> {
        let guard_raw = self.read_numeric(GUARD_TIME.command)?;
        let timeout_raw = self.read_numeric(COMMAND_MODE_TIMEOUT.command)?;

        let guard_ms = GUARD_TIME.to_ms(guard_raw);
        let timeout_ms = COMMAND_MODE_TIMEOUT.to_ms(timeout_raw);
        self.session.update_timing(guard_ms, timeout_ms);

        info!("guard time {} ms, command mode timeout {} ms", guard_ms, timeout_ms);
        Ok(())
    }

    /// Sets the command mode timeout (`CT`).
    ///
    /// `ms` is clamped to 200..=65500 and rounded down to whole 100 ms
    /// units. Returns the timeout the register now holds, in milliseconds.
    ///
    /// # Important Notes
    /// * Takes effect once applied; the session keeps the old value until
    ///   [`refresh_timing`](Device::refresh_timing)
    pub fn set_command_mode_timeout(&mut self, ms: u32, verify: Verify) -> Result<u32, Error> {
        self.write_timing(&COMMAND_MODE_TIMEOUT, ms, verify)
    }

    /// Sets the guard time (`GT`).
    ///
    /// `ms` is clamped to 1..=3300. Returns the guard time the register now
    /// holds, in milliseconds.
    pub fn set_guard_time(&mut self, ms: u32, verify: Verify) -> Result<u32, Error> {
        self.write_timing(&GUARD_TIME, ms, verify)
    }

    fn write_timing(
        &mut self,
        register: &TimingRegister,
        ms: u32,
        verify: Verify,
    ) -> Result<u32, Error> {
        let raw = register.to_raw(ms);
        self.write_numeric(register.command, raw, verify)?;

        let effective = register.to_ms(raw);
        debug!("{} set to {} ms", register.command, effective);
        Ok(effective)
    }

    /// Applies queued register changes (`AC`).
    pub fn apply_changes(&mut self) -> Result<(), Error> {
        self.expect_ok(APPLY_CHANGES)?;
        self.unapplied = PendingChanges::empty();
        Ok(())
    }

    /// Stores the current register values in non-volatile memory (`WR`).
    pub fn write_nonvolatile(&mut self) -> Result<(), Error> {
        self.expect_ok(WRITE_NONVOLATILE)?;
        self.unsaved = PendingChanges::empty();
        Ok(())
    }

    /// Leaves command mode (`CN`), applying any queued changes.
    ///
    /// The session is invalidated, so the next command sends the escape
    /// sequence again.
    pub fn exit_command_mode(&mut self) -> Result<(), Error> {
        self.expect_ok(EXIT_COMMAND_MODE)?;

        self.session.invalidate();
        self.mode = Mode::Transparent;
        self.unapplied = PendingChanges::empty();
        debug!("left command mode");
        Ok(())
    }

    /// Reads the firmware (`VR`) and hardware (`HV`) versions.
    pub fn version(&mut self) -> Result<Version, Error> {
        let firmware = self.read_numeric(FIRMWARE_VERSION)?;
        let hardware = self.read_numeric(HARDWARE_VERSION)?;

        Ok(Version {
            firmware: u16::try_from(firmware).map_err(|_| Error::BadResponse)?,
            hardware: u16::try_from(hardware).map_err(|_| Error::BadResponse)?,
        })
    }

    pub(super) fn expect_ok(&mut self, command: AtCommand) -> Result<(), Error> {
        if self.execute(command, None)?.is_ok() {
            Ok(())
        } else {
            Err(Error::BadResponse)
        }
    }
}
