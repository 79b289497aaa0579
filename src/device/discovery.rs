//! Baud rate discovery and switching

use embedded_hal::digital::OutputPin;

use super::{Device, Mode, Verify};
use crate::config::BAUD_LADDER;
use crate::registers::{baud_from_raw, baud_to_raw, BAUD_RATE};
use crate::transport::{Clock, Transport};
use crate::Error;

impl<T, R, C> Device<T, R, C>
where
    T: Transport,
    R: OutputPin,
    C: Clock,
{
    /// Locates the device's serial rate.
    ///
    /// `target_baud` is tried first. After that each rate of
    /// [`BAUD_LADDER`] is tried once in ascending order, skipping
    /// `target_baud`. A rate counts as found when the escape sequence is
    /// acknowledged with `OK`.
    ///
    /// # Important Notes
    /// * Every attempt sends `+++` and may wait the full enter timeout, so a
    ///   miss on the whole ladder takes several seconds
    /// * The transport is left at the found rate, or at the last rate tried
    ///
    /// # Errors
    /// * [`Error::NotFound`] - no rate produced an `OK`
    pub fn discover(&mut self, target_baud: u32) -> Result<u32, Error> {
        if self.probe_baud(target_baud).is_ok() {
            return Ok(target_baud);
        }

        for baud in BAUD_LADDER.into_iter().filter(|&baud| baud != target_baud) {
            if self.probe_baud(baud).is_ok() {
                info!("device found at {} baud", baud);
                return Ok(baud);
            }
        }

        error!("device not found at any baud rate");
        Err(Error::NotFound)
    }

    fn probe_baud(&mut self, baud: u32) -> Result<(), Error> {
        debug!("probing {} baud", baud);
        self.switch_baud(baud)?;
        self.ensure_command_mode()
    }

    /// Moves the transport to `baud` and forgets command mode, since the
    /// device cannot have seen an escape at the new rate.
    fn switch_baud(&mut self, baud: u32) -> Result<(), Error> {
        self.session.invalidate();
        self.mode = Mode::Transparent;
        self.transport.set_baud(baud)?;
        self.baud = Some(baud);
        Ok(())
    }

    /// Reads the device's serial rate from `BD`.
    pub fn baud_rate(&mut self) -> Result<u32, Error> {
        let raw = self.read_numeric(BAUD_RATE)?;
        baud_from_raw(raw)
    }

    /// Changes the serial rate of both the device and the transport.
    ///
    /// Writes `BD`, leaves command mode so the device switches, moves the
    /// transport to the new rate and re-enters command mode there.
    ///
    /// # Important Notes
    /// * The new rate is not persisted; call
    ///   [`write_nonvolatile`](Device::write_nonvolatile) to keep it
    /// * Every other queued change is applied by the exit as well
    ///
    /// # Errors
    /// * [`Error::InvalidParameter`] - `baud` cannot be encoded in `BD`
    /// * [`Error::FailedCommandMode`] - the device did not answer at the new
    ///   rate
    pub fn set_baud_rate(&mut self, baud: u32) -> Result<(), Error> {
        let raw = baud_to_raw(baud)?;

        self.write_numeric(BAUD_RATE, raw, Verify::No)?;
        self.exit_command_mode()?;
        self.switch_baud(baud)?;

        self.enter_command_mode()
            .map_err(|_| Error::FailedCommandMode)?;
        info!("switched to {} baud", baud);
        Ok(())
    }
}
