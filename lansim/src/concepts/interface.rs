use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use crate::concepts::neighbour::Endpoint;
use crate::concepts::packet::Packet;
use crate::containers::{List, Queue};

/// Administrative state, set by `shutdown` / `no shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminState {
    #[default]
    Up,
    Down,
}

impl Display for AdminState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AdminState::Up => "up",
            AdminState::Down => "down",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub(crate) name: String,
    pub(crate) admin: AdminState,
    pub(crate) address: Option<Ipv4Addr>,
    pub(crate) neighbours: List<Endpoint>,
    pub(crate) inbound: Queue<Packet>,
    pub(crate) outbound: Queue<Packet>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Interface {
            name: name.into(),
            admin: AdminState::Up,
            address: None,
            neighbours: List::new(),
            inbound: Queue::new(),
            outbound: Queue::new(),
        }
    }

    pub fn with_address(name: impl Into<String>, address: Ipv4Addr) -> Self {
        Interface {
            address: Some(address),
            ..Interface::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn admin_state(&self) -> AdminState {
        self.admin
    }
    pub fn is_up(&self) -> bool {
        self.admin == AdminState::Up
    }
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.address
    }
    pub fn neighbours(&self) -> &List<Endpoint> {
        &self.neighbours
    }
    pub fn inbound(&self) -> &Queue<Packet> {
        &self.inbound
    }
    pub fn outbound(&self) -> &Queue<Packet> {
        &self.outbound
    }

    /// Up and attached to at least one link
    pub fn can_transmit(&self) -> bool {
        self.is_up() && !self.neighbours.is_empty()
    }

    pub fn neighbour_on(&self, device: &str) -> Option<&Endpoint> {
        self.neighbours.find(|n| n.device == device)
    }

    pub(crate) fn is_linked_to(&self, remote: &Endpoint) -> bool {
        self.neighbours.contains(|n| n == remote)
    }

    pub(crate) fn add_neighbour(&mut self, remote: Endpoint) {
        if !self.is_linked_to(&remote) {
            self.neighbours.push_back(remote);
        }
    }

    pub(crate) fn remove_neighbour(&mut self, remote: &Endpoint) -> bool {
        self.neighbours.remove_first(|n| n == remote).is_some()
    }
}
