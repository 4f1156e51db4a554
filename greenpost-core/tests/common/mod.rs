//! Common test doubles for integration tests
//!
//! This module provides:
//! - Scripted sensor providers
//! - A loopback connectivity provider that records every request
//! - A counting watchdog and a delay that drives a fixed clock
//! - Configuration and registry fixtures

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

use greenpost_core::{
    config::ClientConfig,
    time::FixedTime,
    traits::{AddressInfo, Connectivity, Liveness, Security, SensorProvider},
    NetworkConfig, ServerConfig,
};

pub const SERVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

pub const REPLY: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";

/// Returns the same raw value for a channel on every read
pub struct ConstantSensors {
    pub values: [u16; 16],
    pub reads: u32,
}

impl ConstantSensors {
    pub fn new(values: &[(u8, u16)]) -> Self {
        let mut table = [0u16; 16];
        for &(channel, raw) in values {
            table[channel as usize] = raw;
        }
        Self { values: table, reads: 0 }
    }
}

impl SensorProvider for ConstantSensors {
    fn read_channel(&mut self, channel: u8) -> u16 {
        self.reads += 1;
        self.values[channel as usize]
    }
}

/// Watchdog double counting every call
#[derive(Debug, Default)]
pub struct MockWatchdog {
    pub armed_with: Option<u32>,
    pub refreshes: u32,
    pub disarms: u32,
}

impl Liveness for MockWatchdog {
    fn arm(&mut self, timeout_ms: u32) {
        self.armed_with = Some(timeout_ms);
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }

    fn disarm(&mut self) {
        self.disarms += 1;
        self.armed_with = None;
    }
}

/// Delay that advances a shared fixed clock instead of sleeping
pub struct ClockDelay<'a> {
    pub clock: &'a FixedTime,
    pub slept_ms: u64,
}

impl<'a> ClockDelay<'a> {
    pub fn new(clock: &'a FixedTime) -> Self {
        Self { clock, slept_ms: 0 }
    }
}

impl DelayNs for ClockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let ms = u64::from(ns / 1_000_000);
        self.clock.advance(ms);
        self.slept_ms += ms;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
        self.slept_ms += u64::from(ms);
    }
}

/// One open loopback connection
pub struct LoopbackConnection {
    sent: Vec<u8>,
    reply: Vec<u8>,
    position: usize,
    close_after_reply: bool,
    write_budget: Option<usize>,
}

impl ErrorType for LoopbackConnection {
    type Error = ErrorKind;
}

impl Write for LoopbackConnection {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(ErrorKind::BrokenPipe);
            }
            let accepted = buf.len().min(*budget);
            *budget -= accepted;
            self.sent.extend_from_slice(&buf[..accepted]);
            return Ok(accepted);
        }
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Read for LoopbackConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.position == self.reply.len() {
            return if self.close_after_reply {
                Ok(0)
            } else {
                Err(ErrorKind::TimedOut)
            };
        }
        let count = buf.len().min(self.reply.len() - self.position);
        buf[..count].copy_from_slice(&self.reply[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

impl ReadReady for LoopbackConnection {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.position < self.reply.len() || self.close_after_reply)
    }
}

/// Connectivity double with scripted failures
pub struct Loopback {
    pub joined: bool,
    pub joins: u32,
    pub join_error: Option<ErrorKind>,
    pub lease_pending: u32,
    pub resolve_pending: u32,
    pub resolve_error: Option<ErrorKind>,
    pub resolves: u32,
    pub connect_error: Option<ErrorKind>,
    pub reply: Vec<u8>,
    pub close_after_reply: bool,
    pub write_budget: Option<usize>,
    pub opened: u32,
    pub requests: Vec<Vec<u8>>,
}

impl Default for Loopback {
    fn default() -> Self {
        Self {
            joined: false,
            joins: 0,
            join_error: None,
            lease_pending: 0,
            resolve_pending: 0,
            resolve_error: None,
            resolves: 0,
            connect_error: None,
            reply: REPLY.to_vec(),
            close_after_reply: true,
            write_budget: None,
            opened: 0,
            requests: Vec::new(),
        }
    }
}

impl Loopback {
    pub fn last_request(&self) -> Option<&str> {
        self.requests
            .last()
            .map(|bytes| std::str::from_utf8(bytes).expect("requests are ASCII"))
    }
}

impl Connectivity for Loopback {
    type Connection = LoopbackConnection;

    fn join(&mut self, _ssid: &str, _passphrase: &str, _security: Security) -> Result<(), ErrorKind> {
        self.joins += 1;
        if let Some(kind) = self.join_error {
            return Err(kind);
        }
        self.joined = true;
        Ok(())
    }

    fn is_joined(&self) -> bool {
        self.joined
    }

    fn await_address_assignment(&mut self) -> nb::Result<AddressInfo, ErrorKind> {
        if self.lease_pending > 0 {
            self.lease_pending -= 1;
            return Err(nb::Error::WouldBlock);
        }
        Ok(AddressInfo {
            address: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 50)),
            gateway: Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))),
            dns: None,
        })
    }

    fn resolve(&mut self, _host: &str) -> nb::Result<IpAddr, ErrorKind> {
        self.resolves += 1;
        if let Some(kind) = self.resolve_error {
            return Err(nb::Error::Other(kind));
        }
        if self.resolve_pending > 0 {
            self.resolve_pending -= 1;
            return Err(nb::Error::WouldBlock);
        }
        Ok(SERVER_IP)
    }

    fn open_tcp(&mut self, ip: IpAddr, port: u16) -> Result<Self::Connection, ErrorKind> {
        assert_eq!((ip, port), (SERVER_IP, 80));
        if let Some(kind) = self.connect_error {
            return Err(kind);
        }
        self.opened += 1;
        Ok(LoopbackConnection {
            sent: Vec::new(),
            reply: self.reply.clone(),
            position: 0,
            close_after_reply: self.close_after_reply,
            write_budget: self.write_budget,
        })
    }

    fn close(&mut self, connection: Self::Connection) {
        self.requests.push(connection.sent);
    }
}

/// Node with one environment sensor and one soil probe, id 400
pub fn greenhouse_config() -> ClientConfig {
    let mut config = ClientConfig {
        network: NetworkConfig::new("greenhouse", "secret", Security::Wpa2Personal).unwrap(),
        server: ServerConfig::new("iot.example.org", 80, "/post").unwrap(),
        ..ClientConfig::default()
    };
    config.identity.id = 400;
    config.identity.digits = 3;
    config.add_environment("in", 0).unwrap();
    config.add_soil("soil_1", 2).unwrap();
    config
}

/// Same node plus a temperature probe on channel 3 with band [10, 30]
pub fn alerting_config() -> ClientConfig {
    let mut config = greenhouse_config();
    config.add_temperature("bench", 3, 10.0, 30.0).unwrap();
    config.alerts.recipient = greenpost_core::config::bounded("recipient", "ops@example.org").unwrap();
    config
}

/// Request head the node sends for a body of `length` bytes
pub fn expected_head(length: usize) -> String {
    format!(
        "POST /post HTTP/1.1\r\n\
         Host: iot.example.org\r\n\
         Content-Type: application/json\r\n\
         User-Agent: greenpost/{}\r\n\
         Connection: close\r\n\
         Content-Length: {}\r\n\
         \r\n",
        greenpost_core::VERSION,
        length
    )
}
