//! Transport Driver
//!
//! Moves one document to the collecting server:
//!
//! ```text
//! Disconnected ─▶ Connecting ─▶ Connected ─▶ Sending ─▶ Draining ─▶ Disconnected
//!        ▲             │                        │           │
//!        └─────────────┴────────────────────────┴───────────┘  (any failure)
//! ```
//!
//! - **Connecting**: resolve the server (cached between cycles) and open TCP
//! - **Sending**: request head with the measured `Content-Length`, then the
//!   body streamed by the Emit pass, checked against that length
//! - **Draining**: read and discard the reply until the peer closes, nothing
//!   arrives for `idle_timeout_ms` or [`MAX_DRAIN_BYTES`] is reached
//!
//! The connection is closed on every path. Nothing here retries a request;
//! a failed cycle is simply tried again after the next sleep.
//!
//! Address assignment and name resolution are polled under a [`RetryPolicy`]
//! with doubling backoff. The watchdog is refreshed on every iteration of
//! every loop.

use core::net::IpAddr;

use embedded_hal::delay::DelayNs;
use embedded_io::{Error as _, ErrorKind, Read, ReadReady, Write};
use heapless::String;

use crate::config::NetworkConfig;
use crate::constants::buffers::{
    DRAIN_CHUNK_SIZE, MAX_AGENT_LEN, MAX_DRAIN_BYTES, MAX_HOST_LEN, MAX_PATH_LEN,
};
use crate::constants::time::{
    DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_RETRY_ATTEMPTS, DRAIN_POLL_INTERVAL_MS,
    INITIAL_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS,
};
use crate::document::Document;
use crate::errors::{TransportError, TransportResult};
use crate::http::RequestHead;
use crate::time::TimeSource;
use crate::traits::{AddressInfo, Connectivity, Liveness};

/// Where the driver is in the request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No connection open
    #[default]
    Disconnected,
    /// Resolving and opening the TCP connection
    Connecting,
    /// Connection open, nothing written yet
    Connected,
    /// Writing head and body
    Sending,
    /// Discarding the reply
    Draining,
}

impl TransportState {
    /// Short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Sending => "sending",
            Self::Draining => "draining",
        }
    }
}

/// Running totals since the driver was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Requests written and flushed completely
    pub requests_sent: u64,
    /// Requests abandoned after the connection was open
    pub requests_failed: u64,
    /// Body bytes written
    pub bytes_sent: u64,
    /// Reply bytes read and discarded
    pub bytes_drained: u64,
    /// TCP connects that failed
    pub connect_failures: u32,
    /// Times the network was joined
    pub joins: u32,
}

/// Outcome of one delivered request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Body bytes written (the advertised `Content-Length`)
    pub body_bytes: usize,
    /// Reply bytes drained
    pub drained_bytes: usize,
}

/// Bounded polling with doubling backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryPolicy {
    /// Polls before giving up
    pub max_attempts: u32,
    /// Pause after the first pending poll
    pub initial_backoff_ms: u32,
    /// Upper bound for any single pause
    pub max_backoff_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            initial_backoff_ms: INITIAL_RETRY_DELAY_MS,
            max_backoff_ms: MAX_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Pause after the `attempt`-th pending poll (zero-based)
    pub fn backoff_ms(&self, attempt: u32) -> u32 {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms)
    }

    /// Poll `op` until it completes, fails or runs out of attempts
    ///
    /// `fail` wraps a provider error into the step's transport error.
    pub fn poll<T, F, D, L>(
        &self,
        step: &'static str,
        fail: fn(ErrorKind) -> TransportError,
        mut op: F,
        delay: &mut D,
        liveness: &mut L,
    ) -> TransportResult<T>
    where
        F: FnMut() -> nb::Result<T, ErrorKind>,
        D: DelayNs,
        L: Liveness,
    {
        for attempt in 0..self.max_attempts {
            liveness.refresh();
            match op() {
                Ok(value) => return Ok(value),
                Err(nb::Error::Other(kind)) => return Err(fail(kind)),
                Err(nb::Error::WouldBlock) => {
                    let pause = self.backoff_ms(attempt);
                    gp_debug!("{} pending, retry {} in {} ms", step, attempt + 1, pause);
                    delay.delay_ms(pause);
                }
            }
        }
        gp_warn!("{} still pending after {} attempts", step, self.max_attempts);
        Err(TransportError::RetriesExhausted {
            step,
            attempts: self.max_attempts,
        })
    }
}

/// Server endpoint and timing for the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Server host name (also the `Host` header)
    pub host: String<MAX_HOST_LEN>,
    /// Server TCP port
    pub port: u16,
    /// Request target
    pub path: String<MAX_PATH_LEN>,
    /// `User-Agent` header value
    pub agent: String<MAX_AGENT_LEN>,
    /// Quiet period that ends draining
    pub idle_timeout_ms: u32,
    /// Polling policy for address assignment and resolution
    pub retry: RetryPolicy,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 80,
            path: String::new(),
            agent: String::new(),
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Drives one request per cycle over a [`Connectivity`] provider
pub struct TransportDriver<C, T, D> {
    connectivity: C,
    clock: T,
    delay: D,
    settings: TransportSettings,
    state: TransportState,
    stats: TransportStats,
    server_ip: Option<IpAddr>,
}

impl<C, T, D> TransportDriver<C, T, D>
where
    C: Connectivity,
    T: TimeSource,
    D: DelayNs,
{
    /// New driver, disconnected
    pub fn new(connectivity: C, clock: T, delay: D, settings: TransportSettings) -> Self {
        Self {
            connectivity,
            clock,
            delay,
            settings,
            state: TransportState::Disconnected,
            stats: TransportStats::default(),
            server_ip: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Totals so far
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Driver settings
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// The connectivity provider
    pub fn connectivity(&self) -> &C {
        &self.connectivity
    }

    /// The connectivity provider, mutably
    pub fn connectivity_mut(&mut self) -> &mut C {
        &mut self.connectivity
    }

    /// The delay provider, shared with the cycle pacing
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Take the driver apart
    pub fn into_parts(self) -> (C, T, D) {
        (self.connectivity, self.clock, self.delay)
    }

    fn enter(&mut self, next: TransportState) {
        gp_debug!("transport {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
    }

    /// Join the network and wait for an address, unless already joined
    ///
    /// Returns the lease when a join happened. Any cached server address is
    /// forgotten after a re-join.
    pub fn ensure_network<L: Liveness>(
        &mut self,
        network: &NetworkConfig,
        liveness: &mut L,
    ) -> TransportResult<Option<AddressInfo>> {
        if self.connectivity.is_joined() {
            return Ok(None);
        }

        gp_info!("joining {}", network.ssid.as_str());
        self.connectivity
            .join(&network.ssid, &network.passphrase, network.security)
            .map_err(TransportError::Join)?;
        liveness.refresh();
        self.stats.joins += 1;

        let connectivity = &mut self.connectivity;
        let lease = self.settings.retry.poll(
            "address assignment",
            TransportError::Address,
            || connectivity.await_address_assignment(),
            &mut self.delay,
            liveness,
        )?;
        liveness.refresh();
        self.server_ip = None;
        Ok(Some(lease))
    }

    /// Server address, resolved once and cached
    pub fn resolve_server<L: Liveness>(&mut self, liveness: &mut L) -> TransportResult<IpAddr> {
        if let Some(ip) = self.server_ip {
            return Ok(ip);
        }

        let connectivity = &mut self.connectivity;
        let host = self.settings.host.as_str();
        let ip = self.settings.retry.poll(
            "name resolution",
            TransportError::Resolve,
            || connectivity.resolve(host),
            &mut self.delay,
            liveness,
        )?;
        liveness.refresh();
        self.server_ip = Some(ip);
        Ok(ip)
    }

    /// Send `document` and drain the reply
    pub fn post<L: Liveness>(
        &mut self,
        document: &Document<'_>,
        liveness: &mut L,
    ) -> TransportResult<Delivery> {
        self.enter(TransportState::Connecting);
        let ip = match self.resolve_server(liveness) {
            Ok(ip) => ip,
            Err(err) => {
                self.enter(TransportState::Disconnected);
                return Err(err);
            }
        };

        let mut connection = match self.connectivity.open_tcp(ip, self.settings.port) {
            Ok(connection) => connection,
            Err(kind) => {
                self.stats.connect_failures += 1;
                // the address may have moved
                self.server_ip = None;
                self.enter(TransportState::Disconnected);
                return Err(TransportError::Connect(kind));
            }
        };
        self.enter(TransportState::Connected);
        liveness.refresh();

        let result = self.exchange(&mut connection, document, liveness);

        self.connectivity.close(connection);
        self.enter(TransportState::Disconnected);

        match result {
            Ok(delivery) => {
                self.stats.requests_sent += 1;
                self.stats.bytes_sent += delivery.body_bytes as u64;
                self.stats.bytes_drained += delivery.drained_bytes as u64;
                gp_info!(
                    "posted {} bytes, drained {} bytes",
                    delivery.body_bytes,
                    delivery.drained_bytes
                );
            }
            Err(err) => {
                self.stats.requests_failed += 1;
                gp_error!("request abandoned: {}", err);
            }
        }
        result
    }

    fn exchange<L: Liveness>(
        &mut self,
        connection: &mut C::Connection,
        document: &Document<'_>,
        liveness: &mut L,
    ) -> TransportResult<Delivery> {
        self.enter(TransportState::Sending);
        let body_bytes = document.length();
        let head = RequestHead::new(&self.settings.host, &self.settings.path, &self.settings.agent);
        head.write_to(connection, body_bytes)?;
        document.emit_checked(connection, liveness, body_bytes)?;
        connection
            .flush()
            .map_err(|err| TransportError::Io(err.kind()))?;

        self.enter(TransportState::Draining);
        let drained_bytes = drain(
            connection,
            &self.clock,
            &mut self.delay,
            self.settings.idle_timeout_ms,
            liveness,
        );
        Ok(Delivery {
            body_bytes,
            drained_bytes,
        })
    }
}

/// Read and discard the reply
///
/// Stops on close, after `idle_timeout_ms` without a byte, or at
/// [`MAX_DRAIN_BYTES`]. Read timeouts count as idle. Other read errors end
/// the drain; the request has already gone out by then.
fn drain<R, T, D, L>(
    connection: &mut R,
    clock: &T,
    delay: &mut D,
    idle_timeout_ms: u32,
    liveness: &mut L,
) -> usize
where
    R: Read + ReadReady,
    T: TimeSource,
    D: DelayNs,
    L: Liveness,
{
    let mut chunk = [0u8; DRAIN_CHUNK_SIZE];
    let mut drained = 0;
    let mut last_byte_at = clock.now();

    while drained < MAX_DRAIN_BYTES {
        liveness.refresh();

        let ready = match connection.read_ready() {
            Ok(ready) => ready,
            Err(err) => {
                gp_warn!("drain stopped: {}", TransportError::Io(err.kind()));
                return drained;
            }
        };

        if ready {
            match connection.read(&mut chunk) {
                Ok(0) => {
                    gp_debug!("peer closed after {} bytes", drained);
                    return drained;
                }
                Ok(read) => {
                    drained += read;
                    last_byte_at = clock.now();
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::TimedOut => {}
                Err(err) => {
                    gp_warn!("drain stopped: {}", TransportError::Io(err.kind()));
                    return drained;
                }
            }
        }

        if clock.elapsed_since(last_byte_at) >= u64::from(idle_timeout_ms) {
            gp_debug!("reply idle for {} ms, {} bytes drained", idle_timeout_ms, drained);
            return drained;
        }
        delay.delay_ms(DRAIN_POLL_INTERVAL_MS);
    }

    gp_warn!("reply exceeds {} bytes, dropping the rest", MAX_DRAIN_BYTES);
    drained
}
