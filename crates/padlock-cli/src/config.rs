//! TOML configuration for the `padlock` binary.
//!
//! ```toml
//! [client]
//! aes_key = "4a1f9c03d25e7b6680f4e2a19c3d5b70"
//! response_timeout_ms = 5000
//!
//! [device]
//! address = "F1:03:32:02:00:78"
//! password = "000000"
//!
//! [notify]
//! base_url = "https://locks.example.com"
//! api_key = "sk_live_..."
//! ```

use anyhow::{Context, Result, bail};
use padlock_client::ClientConfig;
use padlock_core::{DeviceAddress, constants::DEFAULT_PASSWORD};
use padlock_notify::NotifyConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    pub address: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub client: ClientConfig,
    #[serde(default)]
    pub device: DeviceSection,
    /// Remote endpoint informed after confirmed operations. Skipped when absent.
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Address from the command line, falling back to `[device] address`.
    pub fn resolve_address(&self, flag: Option<&str>) -> Result<DeviceAddress> {
        let Some(raw) = flag.or(self.device.address.as_deref()) else {
            bail!("no device address given (use --device or [device] address)");
        };
        Ok(DeviceAddress::new(raw)?)
    }

    /// Password from the command line, then config, then the factory default.
    pub fn resolve_password<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.or(self.device.password.as_deref())
            .unwrap_or(DEFAULT_PASSWORD)
    }
}
