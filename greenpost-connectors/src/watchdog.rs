//! Software watchdog
//!
//! Hosted builds have no hardware watchdog, so supervision is a deadline
//! kept in memory. The binary checks [`SoftwareWatchdog::is_expired`] after
//! each cycle and exits when the node hung for longer than the timeout; a
//! service manager then restarts it, the same way a reset restarts a board.

use std::time::{Duration, Instant};

use greenpost_core::traits::Liveness;
use log::{debug, trace};

/// In-memory deadline implementing `Liveness`
#[derive(Debug, Clone, Default)]
pub struct SoftwareWatchdog {
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    refreshes: u64,
}

impl SoftwareWatchdog {
    /// A disarmed watchdog
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the deadline passed without a refresh
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() > deadline)
    }

    /// Time left before expiry, `None` while disarmed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the watchdog is armed
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Refreshes since creation
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl Liveness for SoftwareWatchdog {
    fn arm(&mut self, timeout_ms: u32) {
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        debug!("watchdog armed for {:?}", timeout);
        self.timeout = Some(timeout);
        self.deadline = Some(Instant::now() + timeout);
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
        if let Some(timeout) = self.timeout {
            trace!("watchdog refreshed");
            self.deadline = Some(Instant::now() + timeout);
        }
    }

    fn disarm(&mut self) {
        debug!("watchdog disarmed");
        self.timeout = None;
        self.deadline = None;
    }
}
