//! Connectivity Provider Seam
//!
//! Everything below HTTP: joining the wireless network, waiting for an
//! address, resolving the server name and opening a TCP connection.
//!
//! ## Contract
//!
//! - `join` blocks until the network accepts or rejects the node
//! - `await_address_assignment` and `resolve` return
//!   `Err(nb::Error::WouldBlock)` while the answer is still pending; the
//!   transport driver polls them under a bounded retry policy
//! - A [`Connectivity::Connection`] reports a closed peer as `Ok(0)` from
//!   `read`, and `read_ready` must not block
//! - `close` always succeeds from the caller's point of view

use core::net::IpAddr;

use embedded_io::{ErrorKind, Read, ReadReady, Write};

/// Wireless security mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Security {
    /// Open network
    Open,
    /// WPA2 personal (pre-shared key)
    #[default]
    Wpa2Personal,
    /// WPA3 personal (SAE)
    Wpa3Personal,
}

/// Address configuration handed out by DHCP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressInfo {
    /// Address assigned to the node
    pub address: IpAddr,
    /// Default gateway, if announced
    pub gateway: Option<IpAddr>,
    /// DNS server, if announced
    pub dns: Option<IpAddr>,
}

/// Network bring-up and TCP connections
pub trait Connectivity {
    /// An open TCP connection
    type Connection: Read + Write + ReadReady;

    /// Associate with the wireless network
    fn join(&mut self, ssid: &str, passphrase: &str, security: Security) -> Result<(), ErrorKind>;

    /// Whether the node is still associated
    fn is_joined(&self) -> bool;

    /// Poll for the DHCP lease
    fn await_address_assignment(&mut self) -> nb::Result<AddressInfo, ErrorKind>;

    /// Poll for the server's address
    fn resolve(&mut self, host: &str) -> nb::Result<IpAddr, ErrorKind>;

    /// Open a TCP connection
    fn open_tcp(&mut self, ip: IpAddr, port: u16) -> Result<Self::Connection, ErrorKind>;

    /// Tear a connection down
    fn close(&mut self, connection: Self::Connection);
}
