//! Command mode state machine and request/response loop

use embedded_hal::digital::OutputPin;

use super::{Device, Mode};
use crate::commands::{AtCommand, ENTER_ACK, ESCAPE_SEQUENCE};
use crate::config::LivenessCheck;
use crate::frame::{Response, Value};
use crate::transport::{Clock, Transport};
use crate::Error;

/// Firmware version read used as a liveness probe. Sent from a constant so
/// probing never disturbs a frame waiting in the transmit buffer.
const PROBE_FRAME: &[u8] = b"ATVR\r";

/// Upper bound on stale frames dropped before a write.
const MAX_STALE_FRAMES: usize = 8;

impl<T, R, C> Device<T, R, C>
where
    T: Transport,
    R: OutputPin,
    C: Clock,
{
    /// Reports whether the device is believed to be in command mode.
    ///
    /// With [`LivenessCheck::Clock`] this only consults the session and the
    /// clock. With [`LivenessCheck::Probe`] a firmware version read is sent
    /// and any reply counts as proof.
    pub fn is_in_command_mode(&mut self) -> bool {
        match self.config.liveness {
            LivenessCheck::Clock => {
                let now = self.clock.now_ms();
                self.session.is_in_command_mode(now)
            }
            LivenessCheck::Probe => self.ping().is_ok(),
        }
    }

    /// Sends a firmware version read and waits for any reply.
    ///
    /// # Important Notes
    /// * Does not enter command mode first. In transparent mode the probe is
    ///   transmitted over the air and no reply arrives
    /// * Overwrites the receive buffer
    pub fn ping(&mut self) -> Result<(), Error> {
        self.discard_pending();
        self.transport.write(PROBE_FRAME)?;
        self.mark_transmitted();

        let timeout = self.config.response_timeout_ms;
        match self.read_response(timeout) {
            Ok(_) if self.last_response().is_error() => Err(Error::BadResponse),
            Ok(_) => {
                self.mode = Mode::CommandMode;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Makes sure the device accepts commands, entering command mode if the
    /// liveness check says it has left.
    pub fn ensure_command_mode(&mut self) -> Result<(), Error> {
        if self.is_in_command_mode() {
            self.mode = Mode::CommandMode;
            return Ok(());
        }
        self.enter_command_mode()
    }

    /// Sends the escape sequence unconditionally and waits for `OK\r`.
    ///
    /// The device only honours `+++` with a guard time of silence on both
    /// sides. If anything was transmitted less than a guard time ago, the
    /// remainder is slept before the escape. On success the guard time is
    /// slept again before returning, so the next frame is not mistaken for
    /// part of the escape.
    ///
    /// # Errors
    /// * [`Error::NoResponse`] - nothing arrived within the enter timeout
    /// * [`Error::BadResponse`] - something other than `OK\r` arrived
    pub fn enter_command_mode(&mut self) -> Result<(), Error> {
        self.mode = Mode::EnteringCommandMode;
        self.session.invalidate();

        let result = self.send_escape();
        match result {
            Ok(()) => {
                let guard = self.session.guard_time_ms();
                self.clock.delay_ms(guard);

                let now = self.clock.now_ms();
                self.session.mark_entered(now);
                self.mode = Mode::CommandMode;
                debug!("entered command mode at {} ms", now);
            }
            Err(err) => {
                self.mode = Mode::Transparent;
                error!("failed to enter command mode: {}", err);
            }
        }
        result
    }

    fn send_escape(&mut self) -> Result<(), Error> {
        self.wait_for_leading_guard();
        self.discard_pending();
        self.transport.write(ESCAPE_SEQUENCE)?;
        self.mark_transmitted();

        let timeout = self.config.enter_timeout_ms;
        match self.read_response(timeout) {
            Ok(len) if self.rx[..len] == ENTER_ACK[..] => Ok(()),
            Ok(_) => Err(Error::BadResponse),
            Err(Error::Timeout) => Err(Error::NoResponse),
            Err(err) => Err(err),
        }
    }

    /// Sends `command` with an optional payload and returns the reply.
    ///
    /// Command mode is entered first when needed. If the reply does not
    /// arrive within the response timeout, command mode is re-entered once
    /// with a fresh escape sequence and the frame is sent once more.
    ///
    /// # Important Notes
    /// * Overwrites the transmit and receive buffers
    /// * Worst case latency is the enter timeout plus twice the guard time
    ///   plus twice the response timeout
    ///
    /// # Errors
    /// * [`Error::FrameOverflow`] / [`Error::InvalidParameter`] - the frame
    ///   could not be built; nothing is sent
    /// * [`Error::FailedCommandMode`] - command mode could not be entered
    /// * [`Error::NoResponse`] - the re-entry after a timeout failed
    /// * [`Error::Timeout`] - the retried frame timed out as well
    /// * [`Error::BadResponse`] - the device replied `ERROR`
    /// * [`Error::BufferOverrun`] - the reply did not fit the receive buffer
    pub fn execute(
        &mut self,
        command: AtCommand,
        payload: Option<Value<'_>>,
    ) -> Result<Response<'_>, Error> {
        let timeout = self.config.response_timeout_ms;
        self.execute_with_timeout(command, payload, timeout)
    }

    /// [`execute`](Device::execute) with an explicit response timeout.
    pub fn execute_with_timeout(
        &mut self,
        command: AtCommand,
        payload: Option<Value<'_>>,
        timeout_ms: u32,
    ) -> Result<Response<'_>, Error> {
        let len = self.transact(command, payload, timeout_ms)?;
        Ok(Response::new(&self.rx[..len]))
    }

    fn transact(
        &mut self,
        command: AtCommand,
        payload: Option<Value<'_>>,
        timeout_ms: u32,
    ) -> Result<usize, Error> {
        self.encoder.build(command, payload)?;

        self.ensure_command_mode()
            .map_err(|_| Error::FailedCommandMode)?;

        match self.exchange(timeout_ms) {
            Err(Error::Timeout) => {
                warn!("{} timed out, re-entering command mode", command);
                self.enter_command_mode().map_err(|_| Error::NoResponse)?;
                self.exchange(timeout_ms)
            }
            result => result,
        }
    }

    /// Writes the frame in the transmit buffer and reads one reply.
    fn exchange(&mut self, timeout_ms: u32) -> Result<usize, Error> {
        self.discard_pending();
        self.transport.write(self.encoder.encoded())?;
        self.mark_transmitted();
        self.mode = Mode::AwaitingResponse;

        match self.read_response(timeout_ms) {
            Ok(len) => {
                self.mode = Mode::CommandMode;
                if self.last_response().is_error() {
                    return Err(Error::BadResponse);
                }
                Ok(len)
            }
            Err(Error::Timeout) => {
                self.mode = Mode::Transparent;
                self.session.invalidate();
                Err(Error::Timeout)
            }
            Err(err) => {
                self.mode = Mode::CommandMode;
                Err(err)
            }
        }
    }

    /// Sleeps until the line has been quiet for the guard time, so the
    /// escape sequence is not taken as payload data.
    fn wait_for_leading_guard(&mut self) {
        let Some(last_tx_at) = self.last_tx_at else {
            return;
        };

        let quiet = self.clock.now_ms().saturating_sub(last_tx_at);
        let guard = u64::from(self.session.guard_time_ms());
        if quiet < guard {
            let wait = (guard - quiet) as u32;
            trace!("waiting {} ms of guard time before escape", wait);
            self.clock.delay_ms(wait);
        }
    }

    fn mark_transmitted(&mut self) {
        self.last_tx_at = Some(self.clock.now_ms());
    }

    /// Polls the transport until a full reply arrives or `timeout_ms` has
    /// been slept away, in steps of the recheck interval.
    fn read_response(&mut self, timeout_ms: u32) -> Result<usize, Error> {
        let step = self.config.recheck_interval_ms.max(1);
        let mut elapsed: u32 = 0;
        self.rx_len = 0;

        loop {
            if self.transport.has_data() {
                let len = self.transport.read_frame(&mut self.rx)?;
                self.rx_len = len;
                trace!("received {} bytes after {} ms", len, elapsed);
                return Ok(len);
            }

            if elapsed >= timeout_ms {
                return Err(Error::Timeout);
            }

            self.clock.delay_ms(step);
            elapsed = elapsed.saturating_add(step);
        }
    }

    /// Drops replies that arrived after their request timed out.
    fn discard_pending(&mut self) {
        for _ in 0..MAX_STALE_FRAMES {
            if !self.transport.has_data() {
                break;
            }
            self.rx_len = 0;
            let _ = self.transport.read_frame(&mut self.rx);
            trace!("discarded stale frame");
        }
    }
}
