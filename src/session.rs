//! Command mode session tracking
//!
//! The device never announces that it has left command mode: it simply
//! stops answering commands once its command mode timeout has elapsed. The
//! [`Session`] records when command mode was last entered and which timing
//! values the device is using, so the driver can predict whether the device
//! is still listening.
//!
//! The prediction is a heuristic. Noise on the line can drop the device out
//! of command mode early, so a command that times out is always treated as
//! evidence that the session is stale.

/// Believed command mode state and the device's negotiated timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    believed_in_command_mode: bool,
    last_entered_at: u64,
    guard_time_ms: u32,
    mode_timeout_ms: u32,
}

impl Session {
    /// Creates a session in transparent mode with assumed timing values.
    pub const fn new(guard_time_ms: u32, mode_timeout_ms: u32) -> Self {
        Self {
            believed_in_command_mode: false,
            last_entered_at: 0,
            guard_time_ms,
            mode_timeout_ms,
        }
    }

    /// Records a confirmed entry into command mode at `now_ms`.
    pub fn mark_entered(&mut self, now_ms: u64) {
        self.believed_in_command_mode = true;
        self.last_entered_at = now_ms;
    }

    /// Forgets command mode, e.g. after an explicit exit, a reset or a baud
    /// rate change.
    pub fn invalidate(&mut self) {
        self.believed_in_command_mode = false;
    }

    /// True while command mode was entered less than the mode timeout ago.
    pub fn is_in_command_mode(&self, now_ms: u64) -> bool {
        self.believed_in_command_mode
            && now_ms.saturating_sub(self.last_entered_at) < u64::from(self.mode_timeout_ms)
    }

    /// Adopts timing values read back from the device.
    pub fn update_timing(&mut self, guard_time_ms: u32, mode_timeout_ms: u32) {
        self.guard_time_ms = guard_time_ms;
        self.mode_timeout_ms = mode_timeout_ms;
    }

    /// Time at which command mode was last entered.
    pub fn last_entered_at(&self) -> u64 {
        self.last_entered_at
    }

    /// Required silence around the escape sequence.
    pub fn guard_time_ms(&self) -> u32 {
        self.guard_time_ms
    }

    /// Inactivity period after which the device leaves command mode.
    pub fn mode_timeout_ms(&self) -> u32 {
        self.mode_timeout_ms
    }
}
