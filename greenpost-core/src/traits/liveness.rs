//! Liveness Supervisor Seam
//!
//! The node is guarded by a watchdog that resets it if nobody refreshes the
//! deadline in time. A stuck join, DHCP or DNS step is therefore bounded by
//! the watchdog, and every legitimate slow step has to refresh it at its
//! natural boundaries so progress isn't mistaken for a hang.
//!
//! Steps receive the supervisor as `&mut impl Liveness` and refresh:
//! - after joining the network
//! - after address assignment and name resolution
//! - after the TCP connect
//! - after each JSON group written
//! - on every retry and drain iteration

/// Watchdog capability
pub trait Liveness {
    /// Start supervision with a deadline of `timeout_ms`
    fn arm(&mut self, timeout_ms: u32);

    /// Push the deadline out by another full timeout
    fn refresh(&mut self);

    /// Stop supervision
    fn disarm(&mut self);
}

impl<T: Liveness + ?Sized> Liveness for &mut T {
    fn arm(&mut self, timeout_ms: u32) {
        (**self).arm(timeout_ms);
    }

    fn refresh(&mut self) {
        (**self).refresh();
    }

    fn disarm(&mut self) {
        (**self).disarm();
    }
}

/// Supervisor for platforms without a watchdog
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLiveness;

impl Liveness for NoopLiveness {
    fn arm(&mut self, _timeout_ms: u32) {}

    fn refresh(&mut self) {}

    fn disarm(&mut self) {}
}
