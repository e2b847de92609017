use thiserror::Error;

use crate::concepts::neighbour::Endpoint;
use crate::concepts::policy::Prefix;

/// Violations of the topology's structural rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Device {0} already exists")]
    DuplicateHostname(String),
    #[error("Device {0} not found")]
    UnknownDevice(String),
    #[error("Interface {interface} already exists on {device}")]
    DuplicateInterfaceName { device: String, interface: String },
    #[error("Interface {interface} not found on {device}")]
    UnknownInterface { device: String, interface: String },
    #[error("{0} is already connected to {1}")]
    AlreadyConnected(Endpoint, Endpoint),
    #[error("{0} is not connected to {1}")]
    NotConnected(Endpoint, Endpoint),
    /// Both ends of a link name the same interface
    #[error("Cannot connect {0} to itself")]
    SelfLink(Endpoint),
    #[error("No policy for {prefix} on {device}")]
    UnknownPolicy { device: String, prefix: Prefix },
}

/// Malformed user input, rejected before any state changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid IP address format: {0}")]
    InvalidAddress(String),
    #[error("Invalid subnet mask {0}, the ones must be contiguous")]
    InvalidMask(String),
    #[error("Invalid TTL {value}, expected a number between 1 and {max}")]
    InvalidTtl { value: String, max: u8 },
    #[error("Invalid hostname {0}, expected letters, digits, '-' or '_'")]
    InvalidHostname(String),
    #[error("Invalid interface name {0}, expected g0/0, f0/1, s0/0 or eth0 style names")]
    InvalidInterfaceName(String),
    #[error("Status must be 'online' or 'offline', got {0}")]
    InvalidStatus(String),
    #[error("Unknown device type {0}, expected router, switch, host or firewall")]
    InvalidDeviceKind(String),
    /// Not a positive number, or more ticks than one command may run
    #[error("Invalid count {0}")]
    InvalidCount(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The sending device has no up interface with a neighbour
    #[error("No route from {0}: no active interface is connected")]
    NoRoute(String),
    #[error("Device {0} is offline")]
    DeviceOffline(String),
}

/// Commands that are unknown, illegal in the current mode, or missing arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("Invalid command '{command}' in {mode} mode. Available: {help}")]
    InvalidCommand {
        command: String,
        mode: &'static str,
        help: String,
    },
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("No console device selected, use 'console <device>' first")]
    NoConsole,
    #[error("Cannot remove {0} while consoled into it")]
    ConsoleInUse(String),
    #[error("Unterminated quote in command line")]
    UnterminatedQuote,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Malformed(String),
    #[error("Cannot access {path}: {message}")]
    Io { path: String, message: String },
    #[error("Configuration files need the serde feature")]
    Unsupported,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    #[error("Dequeue from an empty queue")]
    EmptyQueue,
    #[error("Pop from an empty stack")]
    EmptyStack,
}

/// Every failure the simulator reports. None of them are fatal to a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Mode(#[from] ModeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl Error {
    /// Category name, as recorded in a device's error log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Structural(_) => "StructuralError",
            Error::Validation(_) => "ValidationError",
            Error::Simulation(_) => "SimulationError",
            Error::Mode(_) => "ModeError",
            Error::Config(_) => "ConfigError",
            Error::Container(_) => "ContainerError",
        }
    }
}
