//! Time-Related Constants
//!
//! Intervals, timeouts and backoff values for the measurement cycle.

// ===== CYCLE =====

/// Default pause between measurement cycles (milliseconds).
///
/// Greenhouse climate moves slowly; one report per minute is plenty and
/// keeps the radio mostly idle.
pub const DEFAULT_SEND_INTERVAL_MS: u32 = 60_000;

/// Default idle timeout while draining the response (milliseconds).
///
/// Draining stops once no byte has arrived for this long.
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 3000;

/// Poll period while waiting for response bytes (milliseconds).
pub const DRAIN_POLL_INTERVAL_MS: u32 = 10;

/// Default liveness supervisor timeout (milliseconds).
///
/// Matches the longest hardware watchdog period on 8-bit AVR parts.
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u32 = 8000;

// ===== RETRY AND BACKOFF =====

/// Default attempts for address assignment and name resolution.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 20;

/// Initial retry delay (milliseconds).
pub const INITIAL_RETRY_DELAY_MS: u32 = 250;

/// Maximum retry delay (milliseconds).
///
/// Kept well under the watchdog timeout so every backoff sleep ends with a
/// refresh in time.
pub const MAX_RETRY_DELAY_MS: u32 = 4000;
