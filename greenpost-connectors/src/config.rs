//! JSON configuration files
//!
//! Every section is optional; missing keys fall back to the defaults of
//! `ClientConfig`. The loaded configuration is validated before it is
//! returned, so a file that loads is a file the client accepts.
//!
//! ```json
//! {
//!   "network": { "ssid": "greenhouse", "passphrase": "secret" },
//!   "server": { "host": "iot.example.org", "path": "/post" },
//!   "identity": { "id": 400, "digits": 3 },
//!   "environments": [{ "name": "in", "channel": 0 }],
//!   "soils": [{ "name": "soil_1", "channel": 2 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use greenpost_core::ClientConfig;
use log::debug;

use crate::ConnectorResult;

/// Read and validate the configuration at `path`
pub fn load_config(path: impl AsRef<Path>) -> ConnectorResult<ClientConfig> {
    let path = path.as_ref();
    debug!("loading configuration from {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}

/// Parse and validate a configuration document
pub fn parse_config(text: &str) -> ConnectorResult<ClientConfig> {
    let config: ClientConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}
