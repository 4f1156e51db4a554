//! Buffer Sizes and Capacity Limits
//!
//! Capacities of every bounded string and collection in the node. Values
//! are sized for an 8-bit class device with a few KB of RAM.

// ===== STRINGS =====

/// Maximum sensor name length (bytes).
pub const MAX_NAME_LEN: usize = 31;

/// Maximum identity key length (bytes).
pub const MAX_FIELD_NAME_LEN: usize = 15;

/// Maximum server host name length (bytes).
pub const MAX_HOST_LEN: usize = 63;

/// Maximum request path length (bytes).
pub const MAX_PATH_LEN: usize = 63;

/// Maximum `User-Agent` length (bytes).
pub const MAX_AGENT_LEN: usize = 31;

/// Maximum alert recipient address length (bytes).
pub const MAX_RECIPIENT_LEN: usize = 63;

/// Maximum network name length (bytes, per 802.11).
pub const MAX_SSID_LEN: usize = 32;

/// Maximum network passphrase length (bytes, per WPA2).
pub const MAX_PASSPHRASE_LEN: usize = 63;

// ===== COLLECTIONS =====

/// Maximum sensors across all groups.
pub const MAX_SENSORS: usize = 16;

// ===== RESPONSE DRAINING =====

/// Read chunk while draining the response (bytes).
pub const DRAIN_CHUNK_SIZE: usize = 64;

/// Hard cap on drained response bytes.
///
/// Bounds the drain loop even against a peer that never goes quiet.
pub const MAX_DRAIN_BYTES: usize = 4096;
