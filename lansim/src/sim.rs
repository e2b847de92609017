//! Tick-driven packet movement.
//!
//! A tick runs two phases. In the egress phase every up interface of every online device
//! puts at most one packet from its outbound queue onto the wire, and each copy lands on
//! the inbound queue of the interface at the far end. In the ingress phase every inbound
//! queue is drained: packets addressed to the device are delivered, the rest are relayed
//! onto outbound queues where they wait for the next tick. A packet therefore crosses
//! exactly one link per tick.

use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use log::{debug, trace, warn};

use crate::concepts::history::HistoryEntry;
use crate::concepts::neighbour::Endpoint;
use crate::concepts::packet::{Packet, PacketId};
use crate::concepts::policy::Verdict;
use crate::containers::List;
use crate::feedback::{Error, SimulationError, StructuralError, ValidationError};
use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    TtlExpired,
    /// the egress interface has no links
    NoLink,
    /// the receiving interface is shut down
    InterfaceDown,
    /// a relaying device has no other interface to send on
    NoRoute,
    /// a destination policy of the relaying device blocks the prefix
    PolicyBlock,
    /// the TTL is below the floor a destination policy sets
    PolicyTtl,
}

impl DropReason {
    pub fn is_policy(self) -> bool {
        matches!(self, DropReason::PolicyBlock | DropReason::PolicyTtl)
    }
}

impl Display for DropReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DropReason::TtlExpired => "ttl expired",
            DropReason::NoLink => "no link",
            DropReason::InterfaceDown => "interface down",
            DropReason::NoRoute => "no route",
            DropReason::PolicyBlock => "blocked by policy",
            DropReason::PolicyTtl => "ttl below policy minimum",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    Forwarded,
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEvent {
    pub tick: u64,
    pub packet: PacketId,
    /// previous hop
    pub from: String,
    /// device processing the packet
    pub to: String,
    pub ttl: u8,
    pub outcome: Outcome,
}

impl Display for TickEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}: ", self.from, self.to)?;
        match self.outcome {
            Outcome::Delivered => write!(f, "delivered, TTL at arrival={}", self.ttl),
            Outcome::Forwarded => write!(f, "forwarded, TTL={}", self.ttl),
            Outcome::Dropped(reason) => write!(f, "dropped ({reason})"),
        }
    }
}

/// A packet taken off an outbound queue, with the links it leaves on
struct Departure {
    from: String,
    neighbours: List<Endpoint>,
    packet: Packet,
}

impl Network {
    /// Queues a new packet on the egress interfaces of `source`
    pub fn send(
        &mut self,
        source: &str,
        destination: Ipv4Addr,
        message: impl Into<String>,
        ttl: Option<u8>,
    ) -> Result<PacketId, Error> {
        let ttl = ttl.unwrap_or(self.params.default_ttl);
        let index = self
            .index_of(source)
            .ok_or_else(|| StructuralError::UnknownDevice(source.to_string()))?;
        let device = &self.devices[index];
        if !device.is_online() {
            return Err(SimulationError::DeviceOffline(source.to_string()).into());
        }
        if ttl > self.params.max_ttl {
            return Err(ValidationError::InvalidTtl {
                value: ttl.to_string(),
                max: self.params.max_ttl,
            }
            .into());
        }
        let id = PacketId(self.next_packet);
        let packet = Packet::new(
            id,
            device.hostname(),
            device.primary_address(),
            destination,
            message,
            ttl,
        )?;
        let egress = self.select_egress(index, destination, None);
        if egress.is_empty() {
            return Err(SimulationError::NoRoute(source.to_string()).into());
        }
        self.next_packet += 1;
        let device = &mut self.devices[index];
        for &slot in egress.iter() {
            device.interfaces[slot].outbound.enqueue(packet.clone());
        }
        device.counters.sent += 1;
        self.stats.packets_sent += 1;
        debug!(
            "{source} queued packet {id} for {destination} on {} interface(s)",
            egress.len()
        );
        Ok(id)
    }

    /// Interfaces a packet at `device` should leave on.
    ///
    /// The candidates are the up interfaces with at least one neighbour, other than
    /// `ingress`. If exactly one candidate has a neighbour on the device owning
    /// `destination`, that is the only egress, otherwise the packet floods to all of them.
    fn select_egress(
        &self,
        device: usize,
        destination: Ipv4Addr,
        ingress: Option<usize>,
    ) -> Vec<usize> {
        let interfaces = &self.devices[device].interfaces;
        let candidates: Vec<usize> = interfaces
            .iter()
            .enumerate()
            .filter(|(slot, itf)| Some(*slot) != ingress && itf.can_transmit())
            .map(|(slot, _)| slot)
            .collect();
        if let Some(owner) = self.find_device_by_address(destination) {
            let direct: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&slot| interfaces[slot].neighbour_on(owner.hostname()).is_some())
                .collect();
            if direct.len() == 1 {
                return direct;
            }
        }
        candidates
    }

    /// Advances the simulation by one step and reports what happened to each packet
    pub fn tick(&mut self) -> Vec<TickEvent> {
        let tick = self.tick + 1;
        let mut events = Vec::new();
        self.egress(tick, &mut events);
        self.ingress(tick, &mut events);
        self.tick = tick;
        trace!(
            "Tick {tick}: {} events, {} delivered and {} dropped so far",
            events.len(),
            self.stats.delivered,
            self.stats.dropped
        );
        events
    }

    // region Egress
    fn egress(&mut self, tick: u64, events: &mut Vec<TickEvent>) {
        let mut departures = Vec::new();
        for device in self.devices.iter_mut().filter(|d| d.is_online()) {
            for itf in device.interfaces.iter_mut().filter(|itf| itf.is_up()) {
                if let Ok(packet) = itf.outbound.dequeue() {
                    departures.push(Departure {
                        from: device.hostname.clone(),
                        neighbours: itf.neighbours.clone(),
                        packet,
                    });
                }
            }
        }
        for departure in departures {
            self.transmit(tick, departure, events);
        }
    }

    fn transmit(&mut self, tick: u64, departure: Departure, events: &mut Vec<TickEvent>) {
        let Departure {
            from,
            neighbours,
            packet,
        } = departure;
        *self.stats.activity.entry(from.clone()).or_default() += 1;
        if neighbours.is_empty() {
            // unlinked after the packet was queued, the TTL is spent before the link is resolved
            let ttl = packet.ttl.saturating_sub(1);
            let reason = if ttl == 0 {
                DropReason::TtlExpired
            } else {
                DropReason::NoLink
            };
            self.record_drop(tick, packet.id, &from, &from, ttl, reason, events);
            return;
        }
        let owner = self
            .find_device_by_address(packet.destination)
            .map(|d| d.hostname().to_string());
        let direct = owner
            .as_deref()
            .and_then(|owner| neighbours.find(|n| n.device == owner))
            .cloned();
        let targets = match direct {
            Some(target) => List::from_iter([target]),
            None => neighbours,
        };
        for target in targets.iter() {
            let hop = packet.clone().decrement_and_record(&target.device);
            if hop.is_expired() {
                let reason = DropReason::TtlExpired;
                self.record_drop(tick, hop.id, &from, &target.device, 0, reason, events);
                continue;
            }
            let rejected = match self.endpoint_mut(target) {
                Some(remote) if remote.is_up() => {
                    remote.inbound.enqueue(hop);
                    None
                }
                Some(_) => Some((hop, DropReason::InterfaceDown)),
                None => {
                    debug_assert!(false, "neighbour {target} of {from} does not exist");
                    Some((hop, DropReason::NoLink))
                }
            };
            if let Some((hop, reason)) = rejected {
                self.record_drop(tick, hop.id, &from, &target.device, hop.ttl, reason, events);
            }
        }
    }
    // endregion

    // region Ingress
    fn ingress(&mut self, tick: u64, events: &mut Vec<TickEvent>) {
        for index in 0..self.devices.len() {
            if !self.devices[index].is_online() {
                continue;
            }
            for slot in 0..self.devices[index].interfaces.len() {
                if !self.devices[index].interfaces[slot].is_up() {
                    continue;
                }
                while let Ok(packet) = self.devices[index].interfaces[slot].inbound.dequeue() {
                    self.receive(tick, index, slot, packet, events);
                }
            }
        }
    }

    fn receive(
        &mut self,
        tick: u64,
        index: usize,
        slot: usize,
        packet: Packet,
        events: &mut Vec<TickEvent>,
    ) {
        let to = self.devices[index].hostname.clone();
        let from = packet.previous_hop().unwrap_or(to.as_str()).to_string();

        if self.devices[index].owns(packet.destination) {
            self.stats.delivered += 1;
            self.stats.total_hops += packet.hops() as u64;
            let event = TickEvent {
                tick,
                packet: packet.id,
                from,
                to,
                ttl: packet.ttl,
                outcome: Outcome::Delivered,
            };
            let device = &mut self.devices[index];
            device.counters.received += 1;
            device.history.push(HistoryEntry { packet, tick });
            debug!("[Tick {tick}] {event}");
            events.push(event);
            return;
        }

        let verdict = self.devices[index].policies.check(packet.destination, packet.ttl);
        let refusal = match verdict {
            Verdict::Pass => None,
            Verdict::Blocked => Some((
                "PolicyBlock",
                format!("Packet {} blocked by policy for {}", packet.id, packet.destination),
                DropReason::PolicyBlock,
            )),
            Verdict::BelowTtlMin(min) => Some((
                "PolicyTTL",
                format!("TTL {} below minimum {min} for {}", packet.ttl, packet.destination),
                DropReason::PolicyTtl,
            )),
        };
        if let Some((kind, message, reason)) = refusal {
            debug!("{to} refused packet {}: {message}", packet.id);
            self.record_error_at(tick, &to, kind, message, None);
            self.record_drop(tick, packet.id, &from, &to, packet.ttl, reason, events);
            return;
        }

        let egress = self.select_egress(index, packet.destination, Some(slot));
        if egress.is_empty() {
            warn!(
                "{to} has no route towards {}, dropping packet {}",
                packet.destination, packet.id
            );
            self.record_error_at(
                tick,
                &to,
                "RoutingError",
                format!("No route to {} for packet {}", packet.destination, packet.id),
                None,
            );
            let reason = DropReason::NoRoute;
            self.record_drop(tick, packet.id, &from, &to, packet.ttl, reason, events);
            return;
        }
        let event = TickEvent {
            tick,
            packet: packet.id,
            from,
            to,
            ttl: packet.ttl,
            outcome: Outcome::Forwarded,
        };
        let device = &mut self.devices[index];
        for &egress_slot in egress.iter() {
            device.interfaces[egress_slot].outbound.enqueue(packet.clone());
        }
        device.counters.forwarded += 1;
        self.stats.forwarded += 1;
        debug!("[Tick {tick}] {event}");
        events.push(event);
    }
    // endregion

    #[allow(clippy::too_many_arguments)]
    fn record_drop(
        &mut self,
        tick: u64,
        packet: PacketId,
        from: &str,
        to: &str,
        ttl: u8,
        reason: DropReason,
        events: &mut Vec<TickEvent>,
    ) {
        self.stats.dropped += 1;
        if reason == DropReason::TtlExpired {
            self.stats.dropped_ttl += 1;
        }
        if reason.is_policy() {
            self.stats.dropped_policy += 1;
        }
        let event = TickEvent {
            tick,
            packet,
            from: from.to_string(),
            to: to.to_string(),
            ttl,
            outcome: Outcome::Dropped(reason),
        };
        debug!("[Tick {tick}] {event}");
        events.push(event);
    }
}
