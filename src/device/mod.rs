//! XBee Device Interface
//!
//! This module provides the [`Device`] handle, which owns everything needed to
//! talk to one radio: the serial transport, the reset line, a clock, the
//! command mode [`Session`] and the reusable transmit/receive buffers.
//!
//! The handle is split over several files by concern:
//! - `executor`: the command mode state machine and the request/response loop
//! - `access`: typed register reads, writes and read-back verification
//! - `timing`: guard time / command mode timeout synchronisation and the
//!   execution commands
//! - `discovery`: baud rate probing and switching
//!
//! # Buffers
//! Every operation that talks to the device overwrites the transmit buffer
//! and/or the receive buffer. Replies are returned as [`Response`] values that
//! borrow the receive buffer, so the borrow checker prevents a reply from
//! being held across the next exchange.
//!
//! # Example
//! ```no_run
//! use embedded_hal::digital::OutputPin;
//! use xbee_at::{Clock, Device, DeviceConfig, DriverConfig, Error, Transport};
//!
//! fn bring_up<T: Transport, R: OutputPin, C: Clock>(
//!     transport: T,
//!     reset: R,
//!     clock: C,
//! ) -> Result<Device<T, R, C>, Error> {
//!     let mut device = Device::new(transport, reset, clock, DriverConfig::default());
//!
//!     // Locate the radio, starting with the rate we expect it to use
//!     device.connect(115_200)?;
//!     device.initialize(&DeviceConfig::default())?;
//!
//!     Ok(device)
//! }
//! ```

use embedded_hal::digital::OutputPin;

use crate::config::DriverConfig;
use crate::frame::{FrameEncoder, Response, RX_BUFFER_SIZE};
use crate::registers::PendingChanges;
use crate::session::Session;
use crate::transport::{Clock, Transport};
use crate::Error;

mod access;
mod discovery;
mod executor;
mod timing;

/// Position of the command mode state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// The device is believed to pass serial data through to the air.
    Transparent,
    /// The escape sequence has been sent and the `OK` is awaited.
    EnteringCommandMode,
    /// The device is believed to accept commands.
    CommandMode,
    /// A command frame has been sent and its reply is awaited.
    AwaitingResponse,
}

/// Whether a register write is followed by a read-back.
///
/// Writes are fire-and-forget by default. A verified write costs one extra
/// exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verify {
    /// Only check the `OK` acknowledgment.
    #[default]
    No,
    /// Read the register back and compare it with the written value.
    Yes,
}

/// Main device interface for an XBee radio in AT mode.
///
/// One handle drives one radio from one caller; every operation takes
/// `&mut self`. Dropping the handle leaves the radio as it is.
pub struct Device<T, R, C> {
    transport: T,
    reset: R,
    clock: C,
    config: DriverConfig,
    session: Session,
    mode: Mode,
    encoder: FrameEncoder,
    rx: [u8; RX_BUFFER_SIZE],
    rx_len: usize,
    last_tx_at: Option<u64>,
    baud: Option<u32>,
    ready: bool,
    unapplied: PendingChanges,
    unsaved: PendingChanges,
}

impl<T, R, C> Device<T, R, C> {
    /// Creates a new Device around its collaborators.
    ///
    /// No I/O is performed. Until [`connect`](Device::connect) succeeds the
    /// session uses the guard time and command mode timeout from `config`.
    pub fn new(transport: T, reset: R, clock: C, config: DriverConfig) -> Self {
        Self {
            transport,
            reset,
            clock,
            session: Session::new(config.guard_time_ms, config.command_mode_timeout_ms),
            config,
            mode: Mode::Transparent,
            encoder: FrameEncoder::new(),
            rx: [0; RX_BUFFER_SIZE],
            rx_len: 0,
            last_tx_at: None,
            baud: None,
            ready: false,
            unapplied: PendingChanges::empty(),
            unsaved: PendingChanges::empty(),
        }
    }

    /// Releases the transport, reset line and clock.
    pub fn release(self) -> (T, R, C) {
        (self.transport, self.reset, self.clock)
    }

    /// Host-side configuration in use.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Current command mode bookkeeping.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current state machine position.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Baud rate the transport was last switched to by the driver.
    pub fn baud(&self) -> Option<u32> {
        self.baud
    }

    /// True once [`connect`](Device::connect) has located the device and
    /// synchronised its timing. Cleared by a failed connect.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Registers written but not yet applied with `AC` or `CN`.
    pub fn unapplied(&self) -> PendingChanges {
        self.unapplied
    }

    /// Registers written but not yet stored with `WR`.
    pub fn unsaved(&self) -> PendingChanges {
        self.unsaved
    }

    /// The most recent reply, as left in the receive buffer.
    pub fn last_response(&self) -> Response<'_> {
        Response::new(&self.rx[..self.rx_len])
    }
}

impl<T, R, C> Device<T, R, C>
where
    T: Transport,
    R: OutputPin,
    C: Clock,
{
    /// Brings the link up: releases reset, waits for the module to settle,
    /// discovers its baud rate and reads its timing registers.
    ///
    /// Returns the baud rate the device answered at.
    ///
    /// # Errors
    /// * [`Error::NotFound`] - no baud rate produced an `OK`
    /// * Any error of [`refresh_timing`](Device::refresh_timing)
    /// * [`Error::Unknown`] - the reset line could not be driven
    pub fn connect(&mut self, target_baud: u32) -> Result<u32, Error> {
        self.ready = false;

        // Reset is active low; hold the module out of reset.
        self.reset.set_high().map_err(|_| Error::Unknown)?;
        self.clock.delay_ms(self.config.startup_delay_ms);

        let baud = self.discover(target_baud)?;
        self.refresh_timing()?;
        self.ready = true;

        info!("connected at {} baud", baud);
        Ok(baud)
    }

    /// Writes `config` to the device, verifying each value, and applies it.
    ///
    /// The session timing is re-read afterwards so it reflects the values
    /// the device actually accepted.
    pub fn initialize(&mut self, config: &crate::DeviceConfig) -> Result<(), Error> {
        self.refresh_timing()?;

        let timeout = self.set_command_mode_timeout(config.command_mode_timeout_ms, Verify::Yes)?;
        let guard = self.set_guard_time(config.guard_time_ms, Verify::Yes)?;
        debug!("configured timeout {} ms, guard time {} ms", timeout, guard);

        self.apply_changes()?;
        self.refresh_timing()
    }

    /// Pulses the active-low reset line and waits for the module to boot.
    ///
    /// The device comes back in transparent mode with its non-volatile
    /// settings; unapplied changes are lost.
    pub fn hardware_reset(&mut self) -> Result<(), Error> {
        self.reset.set_low().map_err(|_| Error::Unknown)?;
        self.clock.delay_ms(self.config.reset_pulse_ms);
        self.reset.set_high().map_err(|_| Error::Unknown)?;
        self.clock.delay_ms(self.config.startup_delay_ms);

        self.session.invalidate();
        self.mode = Mode::Transparent;
        self.unapplied = PendingChanges::empty();
        self.unsaved = PendingChanges::empty();

        info!("hardware reset complete");
        Ok(())
    }
}
