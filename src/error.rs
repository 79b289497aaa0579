//! Driver error types
//!
//! Every public operation on [`Device`](crate::Device) returns a
//! `Result<_, Error>`. Expected failure modes (a silent device, a mismatched
//! read-back, an unknown baud rate) are always reported through this enum;
//! nothing in the driver panics for them.

use thiserror::Error;

/// Errors reported by the AT-command session engine.
///
/// # Recovery
/// The executor performs exactly one local recovery step: a [`Error::Timeout`]
/// on a command frame causes command mode to be re-entered and the frame to
/// be re-sent once. Every other error is surfaced to the caller untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No bytes arrived within the operation's timeout window.
    #[error("timed out waiting for a response")]
    Timeout,

    /// The response did not fit in the receive buffer.
    #[error("response larger than the receive buffer")]
    BufferOverrun,

    /// The command frame did not fit in the transmit buffer.
    ///
    /// Nothing was written to the transmit buffer or the transport.
    #[error("command frame larger than the transmit buffer")]
    FrameOverflow,

    /// Bytes were received but their content was not what the exchange
    /// expected (including the device's own `ERROR` reply).
    #[error("unexpected response from the device")]
    BadResponse,

    /// The device stayed silent, even after command mode was re-entered.
    #[error("no response from the device")]
    NoResponse,

    /// A command token or argument was malformed.
    #[error("invalid parameter")]
    InvalidParameter,

    /// Command mode could not be established before sending a frame.
    #[error("could not enter command mode")]
    FailedCommandMode,

    /// A register read back a different value than was written.
    #[error("read-back value does not match the expected value")]
    FailedCompare,

    /// Discovery exhausted the baud-rate ladder.
    #[error("device not found at any standard baud rate")]
    NotFound,

    /// The transport or the reset line reported a failure of its own.
    #[error("transport or reset line failure")]
    Unknown,
}

/// Failures reported by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The pending frame is larger than the caller's buffer. The frame is
    /// discarded.
    #[error("frame larger than the read buffer")]
    Overrun,

    /// Any other failure of the underlying port.
    #[error("serial port failure")]
    Other,
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Overrun => Error::BufferOverrun,
            TransportError::Other => Error::Unknown,
        }
    }
}
