//! Register reads, writes and read-back verification

use embedded_hal::digital::OutputPin;
use heapless::String;

use super::{Device, Verify};
use crate::commands::AtCommand;
use crate::frame::{Value, RX_BUFFER_SIZE};
use crate::registers::PendingChanges;
use crate::transport::{Clock, Transport};
use crate::Error;

impl<T, R, C> Device<T, R, C>
where
    T: Transport,
    R: OutputPin,
    C: Clock,
{
    /// Reads `command` back and compares it with `expected`.
    ///
    /// Numeric values are compared after hex decoding, so `03E8` matches
    /// `0x3E8`. Text values are compared byte for byte after trailing line
    /// endings are removed.
    ///
    /// # Errors
    /// * [`Error::FailedCompare`] - the register holds a different value, or
    ///   a numeric register answered something that is not hex
    /// * Any error of [`execute`](Device::execute)
    pub fn verify(&mut self, command: AtCommand, expected: Value<'_>) -> Result<(), Error> {
        let response = self.execute(command, None)?;

        let matches = match expected {
            Value::Numeric(value) => response.parse_hex() == Ok(value),
            Value::Text(text) => response.trimmed() == text.as_bytes(),
        };

        if matches {
            Ok(())
        } else {
            warn!("{} read back a different value", command);
            Err(Error::FailedCompare)
        }
    }

    /// Writes a numeric register.
    ///
    /// # Important Notes
    /// * The value is queued by the device until applied, see
    ///   [`apply_changes`](Device::apply_changes)
    /// * With [`Verify::Yes`] the register is read back once more
    pub fn write_numeric(
        &mut self,
        command: AtCommand,
        value: u32,
        verify: Verify,
    ) -> Result<(), Error> {
        self.write_value(command, Value::Numeric(value), verify)
    }

    /// Writes a text register such as the node identifier.
    ///
    /// # Errors
    /// * [`Error::InvalidParameter`] - the text contains `\r`
    /// * [`Error::FrameOverflow`] - the text does not fit in one frame
    /// * Any error of [`write_numeric`](Device::write_numeric)
    pub fn write_text(&mut self, command: AtCommand, text: &str, verify: Verify) -> Result<(), Error> {
        self.write_value(command, Value::Text(text), verify)
    }

    /// Writes `value` to `command`, expecting `OK`, then optionally verifies.
    pub fn write_value(
        &mut self,
        command: AtCommand,
        value: Value<'_>,
        verify: Verify,
    ) -> Result<(), Error> {
        let response = self.execute(command, Some(value))?;
        if !response.is_ok() {
            return Err(Error::BadResponse);
        }

        let changed = PendingChanges::for_command(command);
        self.unapplied |= changed;
        self.unsaved |= changed;
        debug!("wrote {}", command);

        match verify {
            Verify::Yes => self.verify(command, value),
            Verify::No => Ok(()),
        }
    }

    /// Reads a numeric register.
    ///
    /// # Errors
    /// * [`Error::BadResponse`] - the reply is not a hex number of at most
    ///   eight digits
    /// * Any error of [`execute`](Device::execute)
    pub fn read_numeric(&mut self, command: AtCommand) -> Result<u32, Error> {
        self.execute(command, None)?.parse_hex()
    }

    /// Reads a text register into an owned string.
    pub fn read_text(&mut self, command: AtCommand) -> Result<String<RX_BUFFER_SIZE>, Error> {
        let response = self.execute(command, None)?;
        let text = response.as_str()?;
        String::try_from(text).map_err(|_| Error::BufferOverrun)
    }
}
