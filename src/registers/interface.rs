//! Serial interface registers

use crate::commands::AtCommand;
use crate::Error;

/// Interface data rate register (`BD`)
///
/// Values `0..=8` select a standard rate from [`STANDARD_BAUD_RATES`]. Values
/// from `0x80` upward are taken as the baud rate itself.
///
/// # Important Notes
/// - The new rate takes effect when command mode is exited (`CN`)
/// - The `OK` for the exit is still sent at the old rate
pub const BAUD_RATE: AtCommand = AtCommand::from_bytes(*b"BD");

/// Standard rates indexed by their `BD` register value.
pub const STANDARD_BAUD_RATES: [u32; 9] = [
    1200, 2400, 4800, 9600, 19200, 38400, 57600, 115_200, 230_400,
];

/// Smallest raw `BD` value interpreted as a literal baud rate.
pub const NON_STANDARD_BAUD_MIN: u32 = 0x80;

/// Encodes a baud rate as a raw `BD` value.
///
/// # Errors
/// * [`Error::InvalidParameter`] - the rate is neither standard nor
///   representable as a non-standard rate
pub fn baud_to_raw(baud: u32) -> Result<u32, Error> {
    match STANDARD_BAUD_RATES.iter().position(|&rate| rate == baud) {
        Some(index) => Ok(index as u32),
        None if baud >= NON_STANDARD_BAUD_MIN => Ok(baud),
        None => Err(Error::InvalidParameter),
    }
}

/// Decodes a raw `BD` value into a baud rate.
///
/// # Errors
/// * [`Error::BadResponse`] - the value lies between the standard table and
///   the non-standard range
pub fn baud_from_raw(raw: u32) -> Result<u32, Error> {
    match STANDARD_BAUD_RATES.get(raw as usize) {
        Some(&rate) => Ok(rate),
        None if raw >= NON_STANDARD_BAUD_MIN => Ok(raw),
        None => Err(Error::BadResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rates_use_table_index() {
        assert_eq!(baud_to_raw(9600), Ok(3));
        assert_eq!(baud_to_raw(115_200), Ok(7));
        assert_eq!(baud_from_raw(3), Ok(9600));
        assert_eq!(baud_from_raw(7), Ok(115_200));
    }

    #[test]
    fn non_standard_rates_are_literal() {
        assert_eq!(baud_to_raw(250_000), Ok(250_000));
        assert_eq!(baud_from_raw(250_000), Ok(250_000));
    }

    #[test]
    fn gaps_are_rejected() {
        assert_eq!(baud_to_raw(100), Err(Error::InvalidParameter));
        assert_eq!(baud_from_raw(0x10), Err(Error::BadResponse));
    }
}
