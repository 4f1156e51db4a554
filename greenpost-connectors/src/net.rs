//! TCP Connectivity over `std::net`
//!
//! ## Overview
//!
//! [`StdConnectivity`] implements the core's `Connectivity` seam with the
//! host's own network stack. The wireless steps a sensor node goes through
//! collapse into quick checks here:
//!
//! - **join**: the host is already on a network; the SSID is logged and the
//!   link is marked up
//! - **address assignment**: reports the interface address the OS routes
//!   outbound traffic through, falling back to loopback when offline
//! - **resolve**: blocking lookup through the system resolver
//!
//! ## Connections
//!
//! [`TcpConnection`] wraps a [`TcpStream`] with a short read timeout so the
//! core's drain loop keeps control of the idle deadline. `read_ready` peeks
//! without blocking.
//!
//! ## Example Usage
//!
//! ```no_run
//! use greenpost_connectors::net::StdConnectivity;
//! use std::time::Duration;
//!
//! let net = StdConnectivity::default()
//!     .connect_timeout(Duration::from_secs(5))
//!     .read_timeout(Duration::from_millis(50));
//! # let _ = net;
//! ```

use std::io::{self, Read as _, Write as _};
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use greenpost_core::traits::{AddressInfo, Connectivity, Security};
use log::{debug, info, warn};

/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default blocking read timeout per `read` call
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Routable address used to pick the outbound interface; nothing is sent
const ROUTE_PROBE: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 80);

/// Map a `std::io` error onto the embedded-io error kinds the core logs
pub fn io_kind(err: &io::Error) -> ErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        io::ErrorKind::ConnectionRefused => ErrorKind::ConnectionRefused,
        io::ErrorKind::ConnectionReset => ErrorKind::ConnectionReset,
        io::ErrorKind::ConnectionAborted => ErrorKind::ConnectionAborted,
        io::ErrorKind::NotConnected => ErrorKind::NotConnected,
        io::ErrorKind::AddrInUse => ErrorKind::AddrInUse,
        io::ErrorKind::AddrNotAvailable => ErrorKind::AddrNotAvailable,
        io::ErrorKind::BrokenPipe => ErrorKind::BrokenPipe,
        io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
        io::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
        io::ErrorKind::InvalidData => ErrorKind::InvalidData,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ErrorKind::TimedOut,
        io::ErrorKind::WriteZero => ErrorKind::WriteZero,
        io::ErrorKind::Interrupted => ErrorKind::Interrupted,
        io::ErrorKind::Unsupported => ErrorKind::Unsupported,
        io::ErrorKind::OutOfMemory => ErrorKind::OutOfMemory,
        _ => ErrorKind::Other,
    }
}

/// Host network stack as a `Connectivity` provider
#[derive(Debug, Clone)]
pub struct StdConnectivity {
    joined: bool,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for StdConnectivity {
    fn default() -> Self {
        Self {
            joined: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl StdConnectivity {
    /// Set the TCP connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-call read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Mark the link down so the next cycle joins again
    pub fn drop_link(&mut self) {
        self.joined = false;
    }

    fn outbound_address() -> io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(ROUTE_PROBE)?;
        Ok(socket.local_addr()?.ip())
    }
}

impl Connectivity for StdConnectivity {
    type Connection = TcpConnection;

    fn join(&mut self, ssid: &str, _passphrase: &str, security: Security) -> Result<(), ErrorKind> {
        info!("using host network for '{}' ({:?})", ssid, security);
        self.joined = true;
        Ok(())
    }

    fn is_joined(&self) -> bool {
        self.joined
    }

    fn await_address_assignment(&mut self) -> nb::Result<AddressInfo, ErrorKind> {
        if !self.joined {
            return Err(nb::Error::Other(ErrorKind::NotConnected));
        }
        let address = Self::outbound_address().unwrap_or_else(|err| {
            warn!("no outbound route ({}), reporting loopback", err);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        });
        Ok(AddressInfo {
            address,
            gateway: None,
            dns: None,
        })
    }

    fn resolve(&mut self, host: &str) -> nb::Result<IpAddr, ErrorKind> {
        let all: Vec<SocketAddr> = (host, 0u16)
            .to_socket_addrs()
            .map_err(|err| {
                warn!("cannot resolve '{}': {}", host, err);
                nb::Error::Other(ErrorKind::NotFound)
            })?
            .collect();
        // IPv4 first, the usual case for sensor backends
        all.iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| all.first())
            .map(SocketAddr::ip)
            .ok_or(nb::Error::Other(ErrorKind::NotFound))
    }

    fn open_tcp(&mut self, ip: IpAddr, port: u16) -> Result<Self::Connection, ErrorKind> {
        let addr = SocketAddr::new(ip, port);
        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(|err| io_kind(&err))?;
        stream
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|err| io_kind(&err))?;
        stream.set_nodelay(true).map_err(|err| io_kind(&err))?;
        debug!("connected to {}", addr);
        Ok(TcpConnection { stream })
    }

    fn close(&mut self, connection: Self::Connection) {
        if let Err(err) = connection.stream.shutdown(Shutdown::Both) {
            // already closed by the peer
            debug!("shutdown: {}", err);
        }
    }
}

/// An open TCP connection
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    /// Address of the server end
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }
}

impl ErrorType for TcpConnection {
    type Error = ErrorKind;
}

impl Read for TcpConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream.read(buf).map_err(|err| io_kind(&err))
    }
}

impl Write for TcpConnection {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|err| io_kind(&err))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|err| io_kind(&err))
    }
}

impl ReadReady for TcpConnection {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let mut probe = [0u8; 1];
        self.stream.set_nonblocking(true).map_err(|err| io_kind(&err))?;
        let peeked = self.stream.peek(&mut probe);
        self.stream.set_nonblocking(false).map_err(|err| io_kind(&err))?;
        match peeked {
            // data, or a closed peer that `read` will report as 0
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(err) => Err(io_kind(&err)),
        }
    }
}
