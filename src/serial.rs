//! `embedded-io` transport adapter
//!
//! [`Uart`] turns any byte stream implementing the `embedded-io` traits into
//! a frame-oriented [`Transport`]. Incoming bytes are assembled into a line
//! buffer until the `\r` delimiter arrives; lines longer than the buffer are
//! discarded up to their delimiter and reported as an overrun.
//!
//! Baud rate changes are hardware specific, so the port must also implement
//! [`SetBaudRate`].

use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;

use crate::error::TransportError;
use crate::frame::{DELIMITER, RX_BUFFER_SIZE};
use crate::transport::Transport;

/// Runtime baud rate control of a serial port.
pub trait SetBaudRate {
    /// Error reported by the port.
    type Error;

    /// Switches the port to `baud`.
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error>;
}

/// Line-assembling [`Transport`] over an `embedded-io` serial port.
#[derive(Debug)]
pub struct Uart<IO, const N: usize = RX_BUFFER_SIZE> {
    io: IO,
    line: Vec<u8, N>,
    complete: bool,
    overrun: bool,
}

impl<IO, const N: usize> Uart<IO, N> {
    /// Wraps a configured serial port.
    pub const fn new(io: IO) -> Self {
        Self {
            io,
            line: Vec::new(),
            complete: false,
            overrun: false,
        }
    }

    /// Releases the underlying port.
    pub fn release(self) -> IO {
        self.io
    }

    fn reset_line(&mut self) {
        self.line.clear();
        self.complete = false;
        self.overrun = false;
    }
}

impl<IO, const N: usize> Uart<IO, N>
where
    IO: Read + ReadReady,
{
    /// Drains ready bytes into the line buffer until a delimiter is seen.
    fn fill(&mut self) -> Result<bool, TransportError> {
        let mut byte = [0u8; 1];

        while !self.complete && self.io.read_ready().map_err(|_| TransportError::Other)? {
            if self.io.read(&mut byte).map_err(|_| TransportError::Other)? == 0 {
                break;
            }

            let is_delimiter = byte[0] == DELIMITER;
            if !self.overrun && self.line.push(byte[0]).is_err() {
                self.overrun = true;
            }
            self.complete = is_delimiter;
        }

        Ok(self.complete)
    }
}

impl<IO, const N: usize> Transport for Uart<IO, N>
where
    IO: Read + ReadReady + Write + SetBaudRate,
{
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.io
            .write_all(bytes)
            .map_err(|_| TransportError::Other)?;
        self.io.flush().map_err(|_| TransportError::Other)
    }

    fn has_data(&mut self) -> bool {
        match self.fill() {
            Ok(complete) => complete,
            Err(_) => {
                warn!("serial read failed, dropping partial line");
                self.reset_line();
                false
            }
        }
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if !self.fill()? {
            return Err(TransportError::Other);
        }

        let len = self.line.len();
        let result = if self.overrun || len > buf.len() {
            Err(TransportError::Overrun)
        } else {
            buf[..len].copy_from_slice(&self.line);
            Ok(len)
        };

        self.reset_line();
        result
    }

    fn set_baud(&mut self, baud: u32) -> Result<(), TransportError> {
        self.reset_line();
        self.io
            .set_baud_rate(baud)
            .map_err(|_| TransportError::Other)
    }
}
