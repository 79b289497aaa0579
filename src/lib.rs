#![cfg_attr(not(test), no_std)]
//! XBee AT Command Driver
//!
//! This crate drives Digi XBee radio modules through their text-based AT
//! command interface. It keeps track of whether the module is in command
//! mode, enters it when needed, sends command frames and decodes the replies,
//! all over a plain serial link with blocking, allocation-free I/O.
//!
//! # Features
//! - Command mode entry with the `+++` escape sequence and guard time
//! - Tracking of the command mode timeout, so the escape is only sent when
//!   the module has dropped back to transparent mode
//! - One automatic re-entry and resend when a command times out
//! - Typed register reads and writes with optional read-back verification
//! - Baud rate discovery and switching
//! - `no_std`, fixed 32 byte transmit and receive buffers
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Main device interface
//!   - Command mode state machine and the retry-once executor
//!   - Register access, timing synchronisation and discovery
//!
//! - [`commands`]: AT command tokens
//!   - [`commands::diagnostic`]: firmware and hardware identification
//!   - [`commands::execution`]: apply, persist and exit
//!
//! - [`registers`]: Register descriptors
//!   - Units and ranges of the guard time and command mode timeout
//!   - Encoding of the interface data rate
//!
//! - [`frame`]: Command frame encoding and reply decoding
//! - [`session`]: Believed command mode state and negotiated timing
//! - [`transport`]: The serial [`Transport`] and [`Clock`] seams
//! - [`serial`]: A [`Transport`] over any `embedded-io` port
//! - [`config`]: Driver and device configuration
//!
//! # Usage
//! The main entry point is the [`Device`] struct, which owns a
//! [`Transport`], the module's reset line and a [`Clock`].
//!
//! Bring-up follows a specific sequence:
//!
//! 1. Create a new [`Device`] with the transport, reset pin and clock
//! 2. [`connect`](Device::connect) to release reset and find the baud rate
//! 3. [`initialize`](Device::initialize) to write the desired timing
//! 4. Read and write registers; command mode is handled transparently
//! 5. [`write_nonvolatile`](Device::write_nonvolatile) to keep the settings
//!
//! # Important Notes
//! - The module never announces leaving command mode; the driver predicts it
//!   from the command mode timeout
//! - Written registers only take effect after `AC` or `CN`
//! - Every operation overwrites the shared transmit and receive buffers
//! - Log output is available through the `defmt` or `log` features
//!
//! # Example
//! ```no_run
//! use embedded_hal::digital::OutputPin;
//! use xbee_at::{Clock, Device, DriverConfig, Error, Transport, Verify, AtCommand};
//!
//! fn rename<T: Transport, R: OutputPin, C: Clock>(
//!     transport: T,
//!     reset: R,
//!     clock: C,
//! ) -> Result<(), Error> {
//!     let mut device = Device::new(transport, reset, clock, DriverConfig::default());
//!     device.connect(9600)?;
//!
//!     let node_identifier = AtCommand::new("NI")?;
//!     device.write_text(node_identifier, "ROUTER-1", Verify::Yes)?;
//!     device.apply_changes()?;
//!     device.write_nonvolatile()?;
//!
//!     Ok(())
//! }
//! ```

#[macro_use]
mod fmt;

pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod registers;
pub mod serial;
pub mod session;
pub mod transport;

pub use commands::*;
pub use config::{DeviceConfig, DriverConfig, LivenessCheck, BAUD_LADDER};
pub use device::{Device, Mode, Verify};
pub use error::{Error, TransportError};
pub use frame::{Frame, FrameEncoder, Response, Value};
pub use registers::*;
pub use serial::{SetBaudRate, Uart};
pub use session::Session;
pub use transport::{Clock, Transport};
