use std::net::Ipv4Addr;

use lansim::concepts::device::DeviceStatus;
use lansim::concepts::interface::AdminState;
use lansim::concepts::policy::{PolicyAction, Prefix};
use lansim::feedback::{Error, SimulationError, StructuralError, ValidationError};
use lansim::network::Network;
use lansim::sim::{DropReason, Outcome};

mod common;

use common::{render, tick_n, topologies};

const R: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

#[test]
fn single_hop_delivery() {
    let mut network = topologies::pair();
    network.send("H", R, "hello", Some(2)).unwrap();

    let events = network.tick();
    assert_eq!(render(&events), ["H → R: delivered, TTL at arrival=1"]);

    let history = network.history("R").unwrap();
    assert_eq!(history.len(), 1);
    let entry = history.peek().unwrap();
    assert_eq!(entry.ttl_at_arrival(), 1);
    assert_eq!(entry.tick, 1);
    assert_eq!(entry.path().iter().cloned().collect::<Vec<_>>(), ["H", "R"]);

    let stats = network.statistics();
    assert_eq!(stats.packets_sent, 1);
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.total_hops, 1);
    assert_eq!(network.device("R").unwrap().counters().received, 1);
    assert_eq!(network.device("H").unwrap().counters().sent, 1);
}

#[test]
fn ttl_of_one_expires_on_first_hop() {
    let mut network = topologies::pair();
    network.send("H", R, "short lived", Some(1)).unwrap();

    let events = network.tick();
    assert_eq!(render(&events), ["H → R: dropped (ttl expired)"]);
    assert_eq!(events[0].outcome, Outcome::Dropped(DropReason::TtlExpired));
    assert!(network.history("R").unwrap().is_empty());
    assert!(network.history("H").unwrap().is_empty());

    let stats = network.statistics();
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.dropped_ttl, 1);
    assert_eq!(stats.delivered, 0);
}

#[test]
fn relay_through_switch_takes_one_tick_per_hop() {
    let mut network = topologies::line();
    network.send("H", R, "via switch", None).unwrap();

    assert_eq!(render(&network.tick()), ["H → S: forwarded, TTL=63"]);
    assert!(network.history("R").unwrap().is_empty());
    assert_eq!(render(&network.tick()), ["S → R: delivered, TTL at arrival=62"]);
    assert!(network.tick().is_empty());

    let entry = network.history("R").unwrap().peek().unwrap().clone();
    assert_eq!(entry.packet.route_trace(), "H → S → R");
    assert_eq!(entry.packet.source_address, Some(Ipv4Addr::new(10, 0, 0, 2)));
    assert_eq!(network.statistics().forwarded, 1);
    assert_eq!(network.statistics().average_hops(), 2.0);
    assert_eq!(network.device("S").unwrap().counters().forwarded, 1);
}

#[test]
fn ttl_expires_part_way() {
    let mut network = topologies::line();
    network.send("H", R, "too far", Some(2)).unwrap();

    let events = tick_n(&mut network, 3);
    assert_eq!(
        render(&events),
        ["H → S: forwarded, TTL=1", "S → R: dropped (ttl expired)"]
    );
    assert!(network.history("R").unwrap().is_empty());
    assert_eq!(network.statistics().dropped_ttl, 1);
}

#[test]
fn relay_through_router_in_lab() {
    let mut network = Network::lab();
    network
        .send("PC1", Ipv4Addr::new(192, 168, 1, 100), "across", None)
        .unwrap();

    assert_eq!(
        render(&tick_n(&mut network, 4)),
        [
            "PC1 → Switch1: forwarded, TTL=63",
            "Switch1 → Router1: forwarded, TTL=62",
            "Router1 → PC2: delivered, TTL at arrival=61",
        ]
    );
    let entry = network.history("PC2").unwrap().peek().unwrap().clone();
    assert_eq!(entry.packet.route_trace(), "PC1 → Switch1 → Router1 → PC2");
}

#[test]
fn ttl_decreases_along_every_delivered_path() {
    let mut network = topologies::star();
    network.send("A", Ipv4Addr::new(10, 0, 0, 12), "to C", Some(5)).unwrap();
    network.send("C", Ipv4Addr::new(10, 0, 0, 11), "to B", Some(5)).unwrap();
    network.send("B", Ipv4Addr::new(10, 0, 0, 10), "to A", Some(3)).unwrap();
    tick_n(&mut network, 8);

    let mut delivered = 0;
    for device in network.devices() {
        for entry in device.history().iter() {
            let packet = &entry.packet;
            assert!(packet.ttl > 0);
            assert_eq!(packet.ttl as usize, packet.original_ttl as usize - packet.hops());
            let origin = packet.path().iter().next().map(String::as_str);
            assert_eq!(origin, Some(packet.source.as_str()));
            assert_eq!(packet.location(), device.hostname());
            delivered += 1;
        }
    }
    assert!(delivered >= 3);
    assert_eq!(delivered as u64, network.statistics().delivered);
}

#[test]
fn flooding_to_unknown_address_dies_out() {
    let mut network = topologies::star();
    network.send("A", Ipv4Addr::new(10, 9, 9, 9), "anyone?", Some(3)).unwrap();

    tick_n(&mut network, 10);
    assert!(network.tick().is_empty());

    let stats = network.statistics();
    assert_eq!(stats.delivered, 0);
    assert!(stats.dropped_ttl > 0);
    // C is a leaf, a copy arriving there has nowhere else to go
    let log = network.error_log("C").unwrap();
    assert!(log.iter().any(|record| record.kind == "RoutingError"));
    for device in network.devices() {
        for itf in device.interfaces() {
            assert!(itf.inbound().is_empty());
            assert!(itf.outbound().is_empty());
        }
    }
}

#[test]
fn leaf_without_other_interface_drops_with_no_route() {
    let mut network = topologies::line();
    // S receives a packet for an address nobody owns and only H is behind it
    network.disconnect("S", "g0/2", "R", "g0/0").unwrap();
    network.send("H", Ipv4Addr::new(172, 16, 0, 1), "lost", None).unwrap();

    let events = network.tick();
    assert_eq!(render(&events), ["H → S: dropped (no route)"]);
    let record = network.error_log("S").unwrap().peek().unwrap().clone();
    assert_eq!(record.kind, "RoutingError");
    assert_eq!(record.command, None);
    assert_eq!(record.tick, 1);
}

#[test]
fn identical_inputs_give_identical_reports() {
    let run = || {
        let mut network = topologies::star();
        network.send("A", Ipv4Addr::new(10, 0, 0, 12), "one", Some(4)).unwrap();
        network.send("B", Ipv4Addr::new(10, 9, 9, 9), "two", Some(3)).unwrap();
        let mut report = render(&tick_n(&mut network, 2));
        network.send("C", Ipv4Addr::new(10, 0, 0, 10), "three", None).unwrap();
        report.extend(render(&tick_n(&mut network, 6)));
        report
    };
    assert_eq!(run(), run());
}

#[test]
fn offline_device_keeps_packets_until_back_online() {
    let mut network = topologies::line();
    network.set_device_status("S", DeviceStatus::Offline).unwrap();
    network.send("H", R, "wait for me", None).unwrap();

    assert!(tick_n(&mut network, 2).is_empty());
    let queued = network.device("S").unwrap().interface("g0/1").unwrap().inbound().len();
    assert_eq!(queued, 1);

    network.set_device_status("S", DeviceStatus::Online).unwrap();
    assert_eq!(render(&network.tick()), ["H → S: forwarded, TTL=63"]);
    assert_eq!(render(&network.tick()), ["S → R: delivered, TTL at arrival=62"]);
}

#[test]
fn shut_interface_rejects_arrivals() {
    let mut network = topologies::pair();
    network
        .set_interface_admin_state("R", "g0/0", AdminState::Down)
        .unwrap();
    network.send("H", R, "knock knock", None).unwrap();

    assert_eq!(render(&network.tick()), ["H → R: dropped (interface down)"]);
    assert_eq!(network.statistics().dropped, 1);
    assert_eq!(network.statistics().dropped_ttl, 0);
}

#[test]
fn send_failures() {
    let mut network = topologies::pair();
    assert_eq!(
        network.send("X", R, "hi", None),
        Err(Error::Structural(StructuralError::UnknownDevice("X".into())))
    );
    assert!(matches!(
        network.send("H", R, "hi", Some(0)),
        Err(Error::Validation(ValidationError::InvalidTtl { .. }))
    ));

    network.set_interface_admin_state("H", "eth0", AdminState::Down).unwrap();
    assert_eq!(
        network.send("H", R, "hi", None),
        Err(Error::Simulation(SimulationError::NoRoute("H".into())))
    );

    network.set_device_status("H", DeviceStatus::Offline).unwrap();
    assert_eq!(
        network.send("H", R, "hi", None),
        Err(Error::Simulation(SimulationError::DeviceOffline("H".into())))
    );
    assert_eq!(network.statistics().packets_sent, 0);
}

#[test]
fn packet_ids_are_sequential() {
    let mut network = topologies::pair();
    let first = network.send("H", R, "a", None).unwrap();
    let second = network.send("H", R, "b", None).unwrap();
    assert!(first < second);
    assert_eq!(second.0, first.0 + 1);

    let events = tick_n(&mut network, 2);
    assert_eq!(events[0].packet, first);
    assert_eq!(events[1].packet, second);
}

#[test]
fn unlinked_egress_still_spends_the_ttl() {
    let mut network = topologies::pair();
    network.send("H", R, "expires", Some(1)).unwrap();
    network.send("H", R, "stranded", Some(5)).unwrap();
    network.disconnect("H", "eth0", "R", "g0/0").unwrap();

    assert_eq!(render(&network.tick()), ["H → H: dropped (ttl expired)"]);
    let events = network.tick();
    assert_eq!(render(&events), ["H → H: dropped (no link)"]);
    assert_eq!(events[0].ttl, 4);

    let stats = network.statistics();
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.dropped_ttl, 1);
}

#[test]
fn relay_blocks_destination_prefix() {
    let mut network = topologies::line();
    let prefix = Prefix::parse("10.0.0.0", "255.255.255.0").unwrap();
    network.set_policy("S", prefix, PolicyAction::Block).unwrap();
    network.send("H", R, "denied", None).unwrap();

    let events = tick_n(&mut network, 3);
    assert_eq!(render(&events), ["H → S: dropped (blocked by policy)"]);
    assert_eq!(events[0].outcome, Outcome::Dropped(DropReason::PolicyBlock));
    assert!(network.history("R").unwrap().is_empty());

    let stats = network.statistics();
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.dropped_policy, 1);
    assert_eq!(stats.dropped_ttl, 0);

    let record = network.error_log("S").unwrap().peek().unwrap().clone();
    assert_eq!(record.kind, "PolicyBlock");
    assert_eq!(record.tick, 1);
    assert_eq!(record.command, None);
    assert!(record.message.contains("10.0.0.1"));

    network.unset_policy("S", prefix).unwrap();
    network.send("H", R, "allowed", None).unwrap();
    assert_eq!(render(&network.tick()), ["H → S: forwarded, TTL=63"]);
}

#[test]
fn relay_enforces_ttl_floor() {
    let mut network = topologies::line();
    let prefix = Prefix::parse("10.0.0.0", "255.255.0.0").unwrap();
    network.set_policy("S", prefix, PolicyAction::TtlMin(3)).unwrap();

    // arrives at S with TTL 2
    network.send("H", R, "too low", Some(3)).unwrap();
    assert_eq!(render(&network.tick()), ["H → S: dropped (ttl below policy minimum)"]);
    let record = network.error_log("S").unwrap().peek().unwrap().clone();
    assert_eq!(record.kind, "PolicyTTL");
    assert_eq!(record.message, "TTL 2 below minimum 3 for 10.0.0.1");

    network.send("H", R, "just enough", Some(4)).unwrap();
    assert_eq!(
        render(&tick_n(&mut network, 2)),
        ["H → S: forwarded, TTL=3", "S → R: delivered, TTL at arrival=2"]
    );
    assert_eq!(network.statistics().dropped_policy, 1);
    assert_eq!(network.statistics().delivered, 1);
}

#[test]
fn policies_do_not_stop_delivery_to_the_owner() {
    let mut network = topologies::pair();
    let everything = Prefix::parse("0.0.0.0", "0.0.0.0").unwrap();
    network.set_policy("R", everything, PolicyAction::Block).unwrap();
    network.send("H", R, "for me", None).unwrap();

    assert_eq!(render(&network.tick()), ["H → R: delivered, TTL at arrival=63"]);
    assert_eq!(network.statistics().dropped_policy, 0);
    assert_eq!(
        network.unset_policy("H", everything),
        Err(StructuralError::UnknownPolicy {
            device: "H".into(),
            prefix: everything,
        })
    );
}
