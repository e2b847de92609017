//! Discrete-tick simulator of a small LAN, driven by a router-style command interpreter.
//!
//! ```
//! use std::net::Ipv4Addr;
//! use lansim::network::Network;
//!
//! let mut network = Network::lab();
//! network.send("PC2", Ipv4Addr::new(192, 168, 1, 1), "ping", Some(4)).unwrap();
//! let events = network.tick();
//! assert_eq!(events[0].to_string(), "PC2 → Router1: delivered, TTL at arrival=3");
//! ```

pub mod cli;
pub mod concepts;
pub mod containers;
pub mod feedback;
pub mod framework;
pub mod network;
#[cfg(feature = "serde")]
pub mod persist;
pub mod report;
pub mod sim;
pub mod util;

pub use feedback::Error;
