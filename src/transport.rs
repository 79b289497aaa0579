//! Collaborator interfaces
//!
//! The driver owns no hardware directly. It talks to the radio through a
//! [`Transport`], keeps time through a [`Clock`], and drives the module's
//! reset input through an [`embedded_hal::digital::OutputPin`].

use embedded_hal::delay::DelayNs;

use crate::error::TransportError;

/// Byte-oriented serial channel to the radio.
///
/// Implementations deliver the device's replies as whole frames: one call to
/// [`read_frame`](Transport::read_frame) returns one `\r`-terminated line,
/// delimiter included. [`Uart`](crate::serial::Uart) adapts any
/// `embedded-io` port to this trait.
pub trait Transport {
    /// Writes `bytes` to the device.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// True when a complete frame is ready to be read.
    fn has_data(&mut self) -> bool;

    /// Copies the next complete frame into `buf` and returns its length.
    ///
    /// # Errors
    /// * [`TransportError::Overrun`] - the frame is larger than `buf`
    /// * [`TransportError::Other`] - no frame is available or the port failed
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Reconfigures the port's baud rate. Partially received data is dropped.
    fn set_baud(&mut self, baud: u32) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        T::write(self, bytes)
    }

    fn has_data(&mut self) -> bool {
        T::has_data(self)
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        T::read_frame(self, buf)
    }

    fn set_baud(&mut self, baud: u32) -> Result<(), TransportError> {
        T::set_baud(self, baud)
    }
}

/// Monotonic millisecond clock with blocking delays.
///
/// Sleeping is provided by [`DelayNs`]; the driver only ever sleeps in whole
/// milliseconds.
pub trait Clock: DelayNs {
    /// Milliseconds since an arbitrary fixed epoch.
    fn now_ms(&mut self) -> u64;
}
