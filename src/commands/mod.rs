//! AT command tokens
//!
//! Every frame sent in command mode starts with a command token. On the wire a
//! token is the literal prefix `AT` followed by a two-character mnemonic, for
//! example `ATCT` for the command-mode timeout register. [`AtCommand`] stores
//! the mnemonic only and is validated on construction, so a frame can never be
//! built from an empty or malformed token.
//!
//! # Command Categories
//! - [`diagnostic`]: read-only identification commands
//!   - Firmware version (`VR`)
//!   - Hardware version (`HV`)
//!
//! - [`execution`]: commands that act on the device instead of a register
//!   - Apply queued changes (`AC`)
//!   - Persist registers to non-volatile memory (`WR`)
//!   - Leave command mode (`CN`)
//!
//! Registers with units or ranges live in [`crate::registers`].
//!
//! # Important Notes
//! - The device answers every command with a single `\r`-terminated line
//! - Register writes answer `OK`, reads answer the value as hex text
//! - Unknown or malformed commands answer `ERROR`

use core::fmt;

use crate::Error;

pub mod diagnostic;
pub mod execution;

pub use diagnostic::*;
pub use execution::*;

/// Literal prefix transmitted before every mnemonic.
pub const AT_PREFIX: &[u8; 2] = b"AT";

/// Escape sequence that moves the device from transparent to command mode.
///
/// Sent on its own with no delimiter. The device must see silence for the
/// guard time on both sides of it.
pub const ESCAPE_SEQUENCE: &[u8; 3] = b"+++";

/// Exact acknowledgment of a successful escape sequence.
pub const ENTER_ACK: &[u8; 3] = b"OK\r";

/// A validated two-character AT command mnemonic.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AtCommand([u8; 2]);

const fn is_mnemonic_byte(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte.is_ascii_digit() || byte == b'%'
}

impl AtCommand {
    /// Creates a command from a mnemonic known at compile time.
    ///
    /// Intended for `const` items; an invalid mnemonic fails const evaluation.
    pub const fn from_bytes(mnemonic: [u8; 2]) -> Self {
        assert!(is_mnemonic_byte(mnemonic[0]) && is_mnemonic_byte(mnemonic[1]));
        Self(mnemonic)
    }

    /// Parses a mnemonic such as `"CT"` or `"ct"`.
    ///
    /// A leading `AT` prefix is accepted and dropped, so `"ATCT"` yields the
    /// same command as `"CT"`.
    ///
    /// # Errors
    /// * [`Error::InvalidParameter`] - empty, wrong length, or a character
    ///   outside `A-Z`, `0-9` and `%`
    pub fn new(mnemonic: &str) -> Result<Self, Error> {
        let bytes = mnemonic.as_bytes();
        let bytes = match bytes {
            [b'A' | b'a', b'T' | b't', rest @ ..] if rest.len() == 2 => rest,
            _ => bytes,
        };

        let [first, second] = bytes else {
            return Err(Error::InvalidParameter);
        };
        let mnemonic = [first.to_ascii_uppercase(), second.to_ascii_uppercase()];

        if mnemonic.iter().all(|&b| is_mnemonic_byte(b)) {
            Ok(Self(mnemonic))
        } else {
            Err(Error::InvalidParameter)
        }
    }

    /// The two mnemonic bytes, without the `AT` prefix.
    pub const fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    /// The mnemonic as text, without the `AT` prefix.
    pub fn mnemonic(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Debug for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT{}", self.mnemonic())
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT{}", self.mnemonic())
    }
}

impl TryFrom<&str> for AtCommand {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
