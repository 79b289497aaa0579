//! Command frame codec
//!
//! Builds outbound command frames into a fixed-capacity transmit buffer and
//! interprets the `\r`-terminated replies.
//!
//! # Frame Format
//! ```text
//! AT<mnemonic>\r                 read / execute
//! AT<mnemonic> <payload>\r       write
//! ```
//! Numeric payloads are uppercase hexadecimal without leading zeros. Text
//! payloads are sent verbatim and must not contain the delimiter.

use heapless::Vec;

use crate::commands::{AtCommand, AT_PREFIX};
use crate::Error;

/// Capacity of the transmit buffer in bytes.
pub const TX_BUFFER_SIZE: usize = 32;

/// Capacity of the receive buffer in bytes.
pub const RX_BUFFER_SIZE: usize = 32;

/// Line delimiter terminating every frame and every reply.
pub const DELIMITER: u8 = b'\r';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A register value carried by a write, or expected by a verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value<'a> {
    /// Integer register, hex encoded on the wire
    Numeric(u32),
    /// String register, sent as-is
    Text(&'a str),
}

impl Value<'_> {
    /// Number of bytes the value occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Numeric(value) => hex_len(*value),
            Value::Text(text) => text.len(),
        }
    }
}

fn hex_len(value: u32) -> usize {
    if value == 0 {
        1
    } else {
        (32 - value.leading_zeros() as usize).div_ceil(4)
    }
}

/// Exact number of bytes [`FrameEncoder::build`] produces for this input.
pub fn encoded_len(payload: Option<&Value<'_>>) -> usize {
    let payload_len = payload.map_or(0, |value| 1 + value.encoded_len());
    AT_PREFIX.len() + 2 + payload_len + 1
}

/// An encoded frame, borrowed from the transmit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    command: AtCommand,
    encoded: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Command the frame was built for.
    pub fn command(&self) -> AtCommand {
        self.command
    }

    /// Encoded bytes, delimiter included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.encoded
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    /// Always false; a frame holds at least a token and a delimiter.
    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }
}

/// Fixed-capacity frame builder.
///
/// The buffer is reused by every build. A successful build overwrites the
/// previous frame, so a frame must be fully sent before the next one is
/// built.
#[derive(Debug, Default)]
pub struct FrameEncoder<const N: usize = TX_BUFFER_SIZE> {
    buf: Vec<u8, N>,
}

impl<const N: usize> FrameEncoder<N> {
    /// Creates an encoder with an empty buffer.
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Capacity of the transmit buffer.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The most recently built frame, or an empty slice.
    pub fn encoded(&self) -> &[u8] {
        &self.buf
    }

    /// Encodes `command` with an optional payload into the transmit buffer.
    ///
    /// # Errors
    /// * [`Error::FrameOverflow`] - the frame would exceed the capacity; the
    ///   buffer is left untouched
    /// * [`Error::InvalidParameter`] - a text payload contains `\r`
    pub fn build(
        &mut self,
        command: AtCommand,
        payload: Option<Value<'_>>,
    ) -> Result<Frame<'_>, Error> {
        if let Some(Value::Text(text)) = payload {
            if text.as_bytes().contains(&DELIMITER) {
                return Err(Error::InvalidParameter);
            }
        }

        if encoded_len(payload.as_ref()) > N {
            return Err(Error::FrameOverflow);
        }

        self.buf.clear();
        self.push(AT_PREFIX)?;
        self.push(command.as_bytes())?;

        match payload {
            Some(Value::Numeric(value)) => {
                self.push(b" ")?;
                let digits = hex_len(value);
                let mut hex = [0u8; 8];
                for (i, slot) in hex[..digits].iter_mut().enumerate() {
                    let shift = 4 * (digits - 1 - i);
                    *slot = HEX_DIGITS[((value >> shift) & 0xF) as usize];
                }
                self.push(&hex[..digits])?;
            }
            Some(Value::Text(text)) => {
                self.push(b" ")?;
                self.push(text.as_bytes())?;
            }
            None => {}
        }

        self.push(&[DELIMITER])?;

        Ok(Frame {
            command,
            encoded: &self.buf,
        })
    }

    fn push(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.buf
            .extend_from_slice(bytes)
            .map_err(|_| Error::FrameOverflow)
    }
}

/// Removes trailing `\r` and `\n` bytes.
pub fn strip_line_endings(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

/// One reply read from the device, borrowed from the receive buffer.
///
/// The next exchange on the device overwrites the receive buffer, so the
/// borrow ends before another command can be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    raw: &'a [u8],
}

impl<'a> Response<'a> {
    /// Wraps raw reply bytes.
    pub fn new(raw: &'a [u8]) -> Self {
        Self { raw }
    }

    /// Raw bytes including the delimiter.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }

    /// Bytes with trailing line endings removed.
    pub fn trimmed(&self) -> &'a [u8] {
        strip_line_endings(self.raw)
    }

    /// Trimmed reply as text.
    ///
    /// # Errors
    /// * [`Error::BadResponse`] - the reply is not valid UTF-8
    pub fn as_str(&self) -> Result<&'a str, Error> {
        core::str::from_utf8(self.trimmed()).map_err(|_| Error::BadResponse)
    }

    /// True when the device acknowledged with `OK`.
    pub fn is_ok(&self) -> bool {
        self.trimmed() == b"OK"
    }

    /// True when the device rejected the command with `ERROR`.
    pub fn is_error(&self) -> bool {
        self.trimmed() == b"ERROR"
    }

    /// Decodes the reply as a hexadecimal register value.
    ///
    /// # Errors
    /// * [`Error::BadResponse`] - empty, longer than eight digits, or not hex
    pub fn parse_hex(&self) -> Result<u32, Error> {
        let digits = self.trimmed();
        if digits.is_empty() || digits.len() > 8 || !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(Error::BadResponse);
        }

        let text = core::str::from_utf8(digits).map_err(|_| Error::BadResponse)?;
        u32::from_str_radix(text, 16).map_err(|_| Error::BadResponse)
    }
}
