use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use log::info;

use crate::concepts::device::{Device, DeviceKind, DeviceStatus, ErrorRecord};
use crate::concepts::history::HistoryEntry;
use crate::concepts::interface::{AdminState, Interface};
use crate::concepts::neighbour::Endpoint;
use crate::concepts::packet::Packet;
use crate::concepts::policy::{PolicyAction, PolicyTable, Prefix};
use crate::containers::{Queue, Stack};
use crate::feedback::{Error, StructuralError, ValidationError};
use crate::framework::SimParams;
use crate::util::{is_valid_hostname, parse_address};

/// Network-wide counters, updated by `send` and `tick`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub packets_sent: u64,
    pub delivered: u64,
    pub forwarded: u64,
    /// every drop, including those counted in `dropped_ttl` and `dropped_policy`
    pub dropped: u64,
    pub dropped_ttl: u64,
    /// relayed packets refused by a destination policy
    pub dropped_policy: u64,
    /// links crossed by delivered packets
    pub total_hops: u64,
    /// packets transmitted per device
    pub activity: BTreeMap<String, u64>,
}

impl Statistics {
    pub fn average_hops(&self) -> f64 {
        if self.delivered == 0 {
            0.0
        } else {
            self.total_hops as f64 / self.delivered as f64
        }
    }

    /// The device that transmitted the most packets, ties go to the lexicographically first
    pub fn top_talker(&self) -> Option<(&str, u64)> {
        self.activity
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (name, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((name.as_str(), count)),
            })
    }
}

/// Queue contents of one interface
#[derive(Debug)]
pub struct QueueState<'a> {
    pub interface: &'a str,
    pub inbound: &'a Queue<Packet>,
    pub outbound: &'a Queue<Packet>,
}

#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) devices: Vec<Device>,
    /// every link once, oldest first
    links: Vec<(Endpoint, Endpoint)>,
    pub(crate) stats: Statistics,
    pub(crate) tick: u64,
    pub(crate) next_packet: u64,
    pub(crate) params: SimParams,
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Network::with_params(SimParams::default())
    }

    pub fn with_params(params: SimParams) -> Self {
        Self {
            devices: Vec::new(),
            links: Vec::new(),
            stats: Statistics::default(),
            tick: 0,
            next_packet: 1,
            params,
        }
    }

    /// The default lab: a router with a switch and PC1 on one side and PC2 on the other
    pub fn lab() -> Self {
        let mut network = Network::new();

        let mut router = Device::new("Router1", DeviceKind::Router);
        router
            .interfaces
            .push(Interface::with_address("g0/0", Ipv4Addr::new(192, 168, 1, 1)));
        router
            .interfaces
            .push(Interface::with_address("g0/1", Ipv4Addr::new(10, 0, 0, 1)));

        let mut switch = Device::new("Switch1", DeviceKind::Switch);
        switch.interfaces.push(Interface::new("g0/1"));
        switch.interfaces.push(Interface::new("g0/2"));

        let mut pc1 = Device::new("PC1", DeviceKind::Host);
        pc1.interfaces
            .push(Interface::with_address("eth0", Ipv4Addr::new(10, 0, 0, 2)));

        let mut pc2 = Device::new("PC2", DeviceKind::Host);
        pc2.interfaces
            .push(Interface::with_address("eth0", Ipv4Addr::new(192, 168, 1, 100)));

        network.devices.extend([router, switch, pc1, pc2]);
        network.link(Endpoint::new("Router1", "g0/0"), Endpoint::new("Switch1", "g0/1"));
        network.link(Endpoint::new("Switch1", "g0/2"), Endpoint::new("PC1", "eth0"));
        network.link(Endpoint::new("Router1", "g0/1"), Endpoint::new("PC2", "eth0"));
        network
    }

    // region Accessors
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, hostname: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.hostname == hostname)
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn history(&self, hostname: &str) -> Result<&Stack<HistoryEntry>, StructuralError> {
        Ok(self.require(hostname)?.history())
    }

    pub fn interfaces(&self, hostname: &str) -> Result<&[Interface], StructuralError> {
        Ok(self.require(hostname)?.interfaces())
    }

    pub fn queue_state(&self, hostname: &str) -> Result<Vec<QueueState<'_>>, StructuralError> {
        Ok(self
            .require(hostname)?
            .interfaces
            .iter()
            .map(|itf| QueueState {
                interface: &itf.name,
                inbound: &itf.inbound,
                outbound: &itf.outbound,
            })
            .collect())
    }

    pub fn error_log(&self, hostname: &str) -> Result<&Queue<ErrorRecord>, StructuralError> {
        Ok(self.require(hostname)?.errors())
    }

    /// Linear scan over every interface of every device
    pub fn find_device_by_address(&self, address: Ipv4Addr) -> Option<&Device> {
        self.devices.iter().find(|d| d.owns(address))
    }

    /// Every link exactly once, in the order the links were made.
    ///
    /// Replaying these through `connect` rebuilds every neighbour list in its current order.
    pub fn links(&self) -> &[(Endpoint, Endpoint)] {
        &self.links
    }

    pub fn policies(&self, hostname: &str) -> Result<&PolicyTable, StructuralError> {
        Ok(self.require(hostname)?.policies())
    }
    // endregion

    // region Lookup
    pub(crate) fn index_of(&self, hostname: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.hostname == hostname)
    }

    fn require(&self, hostname: &str) -> Result<&Device, StructuralError> {
        self.device(hostname)
            .ok_or_else(|| StructuralError::UnknownDevice(hostname.to_string()))
    }

    fn require_mut(&mut self, hostname: &str) -> Result<&mut Device, StructuralError> {
        self.devices
            .iter_mut()
            .find(|d| d.hostname == hostname)
            .ok_or_else(|| StructuralError::UnknownDevice(hostname.to_string()))
    }

    fn require_interface(&self, endpoint: &Endpoint) -> Result<&Interface, StructuralError> {
        self.require(&endpoint.device)?
            .interface(&endpoint.interface)
            .ok_or_else(|| StructuralError::UnknownInterface {
                device: endpoint.device.clone(),
                interface: endpoint.interface.clone(),
            })
    }

    fn require_interface_mut(
        &mut self,
        hostname: &str,
        interface: &str,
    ) -> Result<&mut Interface, StructuralError> {
        self.require_mut(hostname)?
            .interface_mut(interface)
            .ok_or_else(|| StructuralError::UnknownInterface {
                device: hostname.to_string(),
                interface: interface.to_string(),
            })
    }

    pub(crate) fn endpoint_mut(&mut self, endpoint: &Endpoint) -> Option<&mut Interface> {
        self.devices
            .iter_mut()
            .find(|d| d.hostname == endpoint.device)?
            .interface_mut(&endpoint.interface)
    }
    // endregion

    // region Topology
    pub fn add_device(&mut self, hostname: &str, kind: DeviceKind) -> Result<(), Error> {
        if !is_valid_hostname(hostname, self.params.max_hostname_len) {
            return Err(ValidationError::InvalidHostname(hostname.to_string()).into());
        }
        if self.device(hostname).is_some() {
            return Err(StructuralError::DuplicateHostname(hostname.to_string()).into());
        }
        self.devices.push(Device::new(hostname, kind));
        info!("Added {kind} {hostname}");
        Ok(())
    }

    pub fn add_interface(&mut self, hostname: &str, name: &str) -> Result<(), StructuralError> {
        let device = self.require_mut(hostname)?;
        if device.interface(name).is_some() {
            return Err(StructuralError::DuplicateInterfaceName {
                device: hostname.to_string(),
                interface: name.to_string(),
            });
        }
        device.interfaces.push(Interface::new(name));
        info!("Added interface {name} to {hostname}");
        Ok(())
    }

    pub fn set_interface_address(
        &mut self,
        hostname: &str,
        interface: &str,
        address: &str,
    ) -> Result<Ipv4Addr, Error> {
        let address = parse_address(address)?;
        self.require_interface_mut(hostname, interface)?.address = Some(address);
        info!("{hostname}:{interface} is now {address}");
        Ok(address)
    }

    pub fn set_interface_admin_state(
        &mut self,
        hostname: &str,
        interface: &str,
        state: AdminState,
    ) -> Result<(), StructuralError> {
        self.require_interface_mut(hostname, interface)?.admin = state;
        info!("{hostname}:{interface} is administratively {state}");
        Ok(())
    }

    pub fn set_device_status(
        &mut self,
        hostname: &str,
        status: DeviceStatus,
    ) -> Result<(), StructuralError> {
        self.require_mut(hostname)?.status = status;
        info!("{hostname} is now {status}");
        Ok(())
    }

    /// Links two interfaces symmetrically. Both must already exist.
    pub fn connect(
        &mut self,
        device_a: &str,
        interface_a: &str,
        device_b: &str,
        interface_b: &str,
    ) -> Result<(), StructuralError> {
        let a = Endpoint::new(device_a, interface_a);
        let b = Endpoint::new(device_b, interface_b);
        let local = self.require_interface(&a)?;
        self.require_interface(&b)?;
        if a == b {
            return Err(StructuralError::SelfLink(a));
        }
        if local.is_linked_to(&b) {
            return Err(StructuralError::AlreadyConnected(a, b));
        }
        info!("Connected {a} to {b}");
        self.link(a, b);
        Ok(())
    }

    pub fn disconnect(
        &mut self,
        device_a: &str,
        interface_a: &str,
        device_b: &str,
        interface_b: &str,
    ) -> Result<(), StructuralError> {
        let a = Endpoint::new(device_a, interface_a);
        let b = Endpoint::new(device_b, interface_b);
        if !self.require_interface(&a)?.is_linked_to(&b) {
            self.require_interface(&b)?;
            return Err(StructuralError::NotConnected(a, b));
        }
        info!("Disconnected {a} from {b}");
        self.unlink(&a, &b);
        Ok(())
    }

    /// Changes a hostname and every neighbour entry that names it
    pub fn rename_device(&mut self, old: &str, new: &str) -> Result<(), Error> {
        if !is_valid_hostname(new, self.params.max_hostname_len) {
            return Err(ValidationError::InvalidHostname(new.to_string()).into());
        }
        self.require(old)?;
        if old == new {
            return Ok(());
        }
        if self.device(new).is_some() {
            return Err(StructuralError::DuplicateHostname(new.to_string()).into());
        }
        for device in self.devices.iter_mut() {
            if device.hostname == old {
                device.hostname = new.to_string();
            }
            for itf in device.interfaces.iter_mut() {
                for neighbour in itf.neighbours.iter_mut() {
                    if neighbour.device == old {
                        neighbour.device = new.to_string();
                    }
                }
            }
        }
        for (a, b) in self.links.iter_mut() {
            for end in [a, b] {
                if end.device == old {
                    end.device = new.to_string();
                }
            }
        }
        if let Some(count) = self.stats.activity.remove(old) {
            self.stats.activity.insert(new.to_string(), count);
        }
        info!("Renamed {old} to {new}");
        Ok(())
    }

    /// Detaches every link of the device on both sides, then removes it
    pub fn remove_device(&mut self, hostname: &str) -> Result<Device, StructuralError> {
        let index = self
            .index_of(hostname)
            .ok_or_else(|| StructuralError::UnknownDevice(hostname.to_string()))?;
        let device = self.devices.remove(index);
        self.links.retain(|(a, b)| a.device != hostname && b.device != hostname);
        for itf in device.interfaces.iter() {
            let local = Endpoint::new(hostname, &itf.name);
            for remote in itf.neighbours.iter() {
                if let Some(remote_itf) = self.endpoint_mut(remote) {
                    remote_itf.remove_neighbour(&local);
                }
            }
        }
        info!("Removed {hostname}");
        Ok(device)
    }

    /// Adds both neighbour entries, endpoints must have been validated
    fn link(&mut self, a: Endpoint, b: Endpoint) {
        if let Some(itf) = self.endpoint_mut(&a) {
            itf.add_neighbour(b.clone());
        }
        if let Some(itf) = self.endpoint_mut(&b) {
            itf.add_neighbour(a.clone());
        }
        self.links.push((a, b));
    }

    fn unlink(&mut self, a: &Endpoint, b: &Endpoint) {
        if let Some(itf) = self.endpoint_mut(a) {
            itf.remove_neighbour(b);
        }
        if let Some(itf) = self.endpoint_mut(b) {
            itf.remove_neighbour(a);
        }
        self.links.retain(|(x, y)| !((x == a && y == b) || (x == b && y == a)));
    }
    // endregion

    // region Policies
    pub fn set_policy(
        &mut self,
        hostname: &str,
        prefix: Prefix,
        action: PolicyAction,
    ) -> Result<(), StructuralError> {
        self.require_mut(hostname)?.policies.set(prefix, action);
        info!("{hostname} applies {action:?} to {prefix}");
        Ok(())
    }

    pub fn unset_policy(&mut self, hostname: &str, prefix: Prefix) -> Result<(), StructuralError> {
        if !self.require_mut(hostname)?.policies.unset(prefix) {
            return Err(StructuralError::UnknownPolicy {
                device: hostname.to_string(),
                prefix,
            });
        }
        info!("{hostname} no longer has policies for {prefix}");
        Ok(())
    }
    // endregion

    /// Appends to a device's error log, ignoring unknown devices
    pub fn record_error(
        &mut self,
        hostname: &str,
        kind: &'static str,
        message: String,
        command: Option<String>,
    ) {
        self.record_error_at(self.tick, hostname, kind, message, command);
    }

    /// Like `record_error`, for errors raised while `tick` is being processed
    pub(crate) fn record_error_at(
        &mut self,
        tick: u64,
        hostname: &str,
        kind: &'static str,
        message: String,
        command: Option<String>,
    ) {
        let capacity = self.params.error_log_capacity;
        if let Ok(device) = self.require_mut(hostname) {
            device.log_error(
                ErrorRecord {
                    tick,
                    kind,
                    message,
                    command,
                },
                capacity,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_links_are_listed_once_in_creation_order() {
        let network = Network::lab();
        let links: Vec<String> = network
            .links()
            .iter()
            .map(|(a, b)| format!("{a}-{b}"))
            .collect();
        assert_eq!(
            links,
            [
                "Router1:g0/0-Switch1:g0/1",
                "Switch1:g0/2-PC1:eth0",
                "Router1:g0/1-PC2:eth0"
            ]
        );
    }

    #[test]
    fn loopback_cable_on_one_device_is_one_link() {
        let mut network = Network::new();
        network.add_device("R", DeviceKind::Router).unwrap();
        network.add_interface("R", "g0/0").unwrap();
        network.add_interface("R", "g0/1").unwrap();
        network.connect("R", "g0/0", "R", "g0/1").unwrap();
        assert_eq!(network.links().len(), 1);
        network.disconnect("R", "g0/1", "R", "g0/0").unwrap();
        assert!(network.links().is_empty());
    }

    #[test]
    fn top_talker_prefers_highest_count() {
        let mut stats = Statistics::default();
        stats.activity.insert("A".into(), 2);
        stats.activity.insert("B".into(), 5);
        stats.activity.insert("C".into(), 5);
        assert_eq!(stats.top_talker(), Some(("B", 5)));
        assert_eq!(Statistics::default().top_talker(), None);
    }
}
