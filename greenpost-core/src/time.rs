//! Time management for the sensor node
//!
//! The node needs time for two things only: the idle timeout while draining
//! a response, and pacing retries and cycles. Both are relative, so a
//! monotonic millisecond counter is all a platform has to provide.

use core::cell::Cell;

/// Timestamp in milliseconds since an arbitrary origin (usually boot)
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Milliseconds elapsed since `earlier`, saturating at zero
    fn elapsed_since(&self, earlier: Timestamp) -> u64 {
        self.now().saturating_sub(earlier)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Manually driven time source for tests and simulations
///
/// Interior mutability lets a mock delay or connection advance the clock
/// while the driver only holds a shared reference.
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Cell<Timestamp>,
}

impl FixedTime {
    /// Start the clock at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}
