//! Print the exact request a node would send
//!
//! Builds a greenhouse configuration, feeds it fixed raw samples and writes
//! the HTTP head plus JSON body to stdout, through the same two passes the
//! transport uses.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example print_request
//! ```

use std::io::Write as _;

use embedded_io::{ErrorType, Write};
use greenpost_core::{
    alert::refresh_alerts, config::bounded, ClientConfig, Document, NoopLiveness, RequestHead,
    SensorProvider,
};

/// Forwards to stdout
struct Stdout(std::io::Stdout);

impl ErrorType for Stdout {
    type Error = embedded_io::ErrorKind;
}

impl Write for Stdout {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf).map_err(|_| embedded_io::ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush().map_err(|_| embedded_io::ErrorKind::Other)
    }
}

/// Fixed raw counts per channel
struct Bench;

impl SensorProvider for Bench {
    fn read_channel(&mut self, channel: u8) -> u16 {
        match channel {
            0 => 51,   // ~24.9 C
            1 => 300,  // light 723
            2 => 420,  // soil ~41 %
            3 => 72,   // ~35.2 C, above the band
            _ => 0,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::default();
    config.identity.id = 400;
    config.identity.digits = 3;
    config.server.host = bounded("host", "iot.example.org")?;
    config.server.path = bounded("path", "/post")?;
    config.network.ssid = bounded("ssid", "greenhouse")?;
    config.alerts.recipient = bounded("recipient", "ops@example.org")?;
    config.add_environment("in", 0)?;
    config.add_soil("soil_1", 2)?;
    config.add_temperature("bench", 3, 10.0, 30.0)?;
    config.validate()?;

    let mut registry = config.build_registry()?;
    registry.measure_all(&config.sampler()?, &mut Bench, &mut NoopLiveness);
    let alerts = refresh_alerts(&mut registry);

    let identity = config.identity()?;
    let document = Document::build(&registry, &identity, &config.layout());
    let length = document.length();

    let settings = config.transport_settings();
    let head = RequestHead::new(&settings.host, &settings.path, &settings.agent);

    let mut out = Stdout(std::io::stdout());
    head.write_to(&mut out, length)?;
    document.write_to(&mut out, &mut NoopLiveness)?;
    out.flush().map_err(|kind| format!("{kind:?}"))?;

    eprintln!("\n\n{} body bytes, {} alerts", length, alerts);
    Ok(())
}
