use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::history::HistoryEntry;
use crate::concepts::interface::Interface;
use crate::concepts::policy::PolicyTable;
use crate::containers::{Queue, Stack};
use crate::feedback::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum DeviceKind {
    Router,
    Switch,
    Host,
    Firewall,
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeviceKind::Router => "router",
            DeviceKind::Switch => "switch",
            DeviceKind::Host => "host",
            DeviceKind::Firewall => "firewall",
        })
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "router" => Ok(DeviceKind::Router),
            "switch" => Ok(DeviceKind::Switch),
            "host" => Ok(DeviceKind::Host),
            "firewall" => Ok(DeviceKind::Firewall),
            _ => Err(ValidationError::InvalidDeviceKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    #[default]
    Online,
    Offline,
}

impl Display for DeviceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        })
    }
}

impl FromStr for DeviceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(DeviceStatus::Online),
            "offline" => Ok(DeviceStatus::Offline),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCounters {
    pub sent: u64,
    /// packets delivered to this device
    pub received: u64,
    /// packets relayed towards another device
    pub forwarded: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub tick: u64,
    pub kind: &'static str,
    pub message: String,
    /// the command line that failed, absent for errors raised by the engine
    pub command: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Device {
    pub(crate) hostname: String,
    pub(crate) kind: DeviceKind,
    pub(crate) status: DeviceStatus,
    pub(crate) interfaces: Vec<Interface>,
    pub(crate) history: Stack<HistoryEntry>,
    pub(crate) errors: Queue<ErrorRecord>,
    pub(crate) counters: DeviceCounters,
    pub(crate) policies: PolicyTable,
}

impl Device {
    pub fn new(hostname: impl Into<String>, kind: DeviceKind) -> Self {
        Device {
            hostname: hostname.into(),
            kind,
            status: DeviceStatus::Online,
            interfaces: Vec::new(),
            history: Stack::new(),
            errors: Queue::new(),
            counters: DeviceCounters::default(),
            policies: PolicyTable::new(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }
    pub fn status(&self) -> DeviceStatus {
        self.status
    }
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
    pub fn counters(&self) -> DeviceCounters {
        self.counters
    }
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }
    pub fn history(&self) -> &Stack<HistoryEntry> {
        &self.history
    }
    pub fn errors(&self) -> &Queue<ErrorRecord> {
        &self.errors
    }
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|itf| itf.name == name)
    }

    pub(crate) fn interface_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.interfaces.iter_mut().find(|itf| itf.name == name)
    }

    /// True if any of the interfaces carries `address`, regardless of admin state
    pub fn owns(&self, address: Ipv4Addr) -> bool {
        self.interfaces.iter().any(|itf| itf.address == Some(address))
    }

    pub fn primary_address(&self) -> Option<Ipv4Addr> {
        self.interfaces.iter().find_map(|itf| itf.address)
    }

    /// Appends to the bounded error log, discarding the oldest records beyond `capacity`
    pub(crate) fn log_error(&mut self, record: ErrorRecord, capacity: usize) {
        self.errors.enqueue(record);
        while self.errors.len() > capacity {
            if self.errors.dequeue().is_err() {
                break;
            }
        }
    }
}
