//! JSON configuration files.
//!
//! A configuration lists devices with their interfaces and policies, then every link once
//! in the order the links were made. Queued packets, histories, counters and error logs are
//! runtime state and are not saved.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::concepts::device::{DeviceKind, DeviceStatus};
use crate::concepts::interface::AdminState;
use crate::concepts::policy::{PolicyAction, Prefix};
use crate::feedback::ConfigError;
use crate::network::Network;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    #[serde(default = "current_version")]
    pub version: u32,
    pub devices: Vec<DeviceConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default = "yes")]
    pub online: bool,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<PolicyConfig>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InterfaceConfig {
    pub name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default = "yes")]
    pub is_up: bool,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    pub prefix: String,
    pub mask: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub block: bool,
    #[serde(default)]
    pub ttl_min: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub device1: String,
    pub interface1: String,
    pub device2: String,
    pub interface2: String,
}

fn current_version() -> u32 {
    CONFIG_VERSION
}

fn yes() -> bool {
    true
}

impl NetworkConfig {
    pub fn capture(network: &Network) -> Self {
        let devices = network
            .devices()
            .iter()
            .map(|device| DeviceConfig {
                name: device.hostname().to_string(),
                kind: device.kind(),
                online: device.is_online(),
                interfaces: device
                    .interfaces()
                    .iter()
                    .map(|itf| InterfaceConfig {
                        name: itf.name().to_string(),
                        ip_address: itf.address().map(|a| a.to_string()),
                        is_up: itf.is_up(),
                    })
                    .collect(),
                policies: device
                    .policies()
                    .rules()
                    .iter()
                    .map(|rule| PolicyConfig {
                        prefix: rule.prefix.network().to_string(),
                        mask: rule.prefix.mask().to_string(),
                        block: rule.block,
                        ttl_min: rule.ttl_min,
                    })
                    .collect(),
            })
            .collect();
        let connections = network
            .links()
            .iter()
            .map(|(a, b)| ConnectionConfig {
                device1: a.device.clone(),
                interface1: a.interface.clone(),
                device2: b.device.clone(),
                interface2: b.interface.clone(),
            })
            .collect();
        NetworkConfig {
            version: CONFIG_VERSION,
            devices,
            connections,
        }
    }

    /// Rebuilds a network through the topology operations, so every rule they enforce applies
    pub fn build(&self) -> Result<Network, ConfigError> {
        if self.version > CONFIG_VERSION {
            return Err(ConfigError::Malformed(format!(
                "unsupported version {}",
                self.version
            )));
        }
        let mut network = Network::new();
        for device in &self.devices {
            network
                .add_device(&device.name, device.kind)
                .map_err(|e| malformed(&device.name, e))?;
            for itf in &device.interfaces {
                network
                    .add_interface(&device.name, &itf.name)
                    .map_err(|e| malformed(&device.name, e))?;
                if let Some(address) = &itf.ip_address {
                    network
                        .set_interface_address(&device.name, &itf.name, address)
                        .map_err(|e| malformed(&device.name, e))?;
                }
                if !itf.is_up {
                    network
                        .set_interface_admin_state(&device.name, &itf.name, AdminState::Down)
                        .map_err(|e| malformed(&device.name, e))?;
                }
            }
            for policy in &device.policies {
                let prefix = Prefix::parse(&policy.prefix, &policy.mask)
                    .map_err(|e| malformed(&device.name, e))?;
                let actions = [
                    policy.block.then_some(PolicyAction::Block),
                    policy.ttl_min.map(PolicyAction::TtlMin),
                ];
                for action in actions.into_iter().flatten() {
                    network
                        .set_policy(&device.name, prefix, action)
                        .map_err(|e| malformed(&device.name, e))?;
                }
            }
            if !device.online {
                network
                    .set_device_status(&device.name, DeviceStatus::Offline)
                    .map_err(|e| malformed(&device.name, e))?;
            }
        }
        for link in &self.connections {
            network
                .connect(&link.device1, &link.interface1, &link.device2, &link.interface2)
                .map_err(|e| ConfigError::Malformed(format!("connection: {e}")))?;
        }
        Ok(network)
    }
}

pub fn save_config(network: &Network) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(&NetworkConfig::capture(network))
        .map_err(|e| ConfigError::Malformed(e.to_string()))
}

pub fn load_config(source: &str) -> Result<Network, ConfigError> {
    let config: NetworkConfig =
        serde_json::from_str(source).map_err(|e| ConfigError::Malformed(e.to_string()))?;
    config.build()
}

pub fn save_file(network: &Network, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let json = save_config(network)?;
    fs::write(path, json).map_err(|e| io_error(path, e))
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Network, ConfigError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    load_config(&json)
}

fn malformed(device: &str, err: impl Display) -> ConfigError {
    ConfigError::Malformed(format!("device {device}: {err}"))
}

fn io_error(path: &Path, err: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
