use lansim::concepts::device::DeviceKind;
use lansim::network::Network;

/// Adds a device with `(interface, address)` pairs
pub fn device(
    network: &mut Network,
    hostname: &str,
    kind: DeviceKind,
    interfaces: &[(&str, Option<&str>)],
) {
    network.add_device(hostname, kind).unwrap();
    for (name, address) in interfaces {
        network.add_interface(hostname, name).unwrap();
        if let Some(address) = address {
            network.set_interface_address(hostname, name, address).unwrap();
        }
    }
}

pub fn links(network: &mut Network, links: &[(&str, &str, &str, &str)]) {
    for (a, a_if, b, b_if) in links {
        network.connect(a, a_if, b, b_if).unwrap();
    }
}

/// R (10.0.0.1 on g0/0) linked to H (eth0, no address)
pub fn pair() -> Network {
    let mut network = Network::new();
    device(&mut network, "R", DeviceKind::Router, &[("g0/0", Some("10.0.0.1"))]);
    device(&mut network, "H", DeviceKind::Host, &[("eth0", None)]);
    links(&mut network, &[("R", "g0/0", "H", "eth0")]);
    network
}

/// H (10.0.0.2) - S - R (10.0.0.1), the switch has no addresses
pub fn line() -> Network {
    let mut network = Network::new();
    device(&mut network, "H", DeviceKind::Host, &[("eth0", Some("10.0.0.2"))]);
    device(&mut network, "S", DeviceKind::Switch, &[("g0/1", None), ("g0/2", None)]);
    device(&mut network, "R", DeviceKind::Router, &[("g0/0", Some("10.0.0.1"))]);
    links(&mut network, &[("H", "eth0", "S", "g0/1"), ("S", "g0/2", "R", "g0/0")]);
    network
}

/// A switch hub with three hosts, A and B also share a direct cable
pub fn star() -> Network {
    let mut network = Network::new();
    device(
        &mut network,
        "S",
        DeviceKind::Switch,
        &[("g0/1", None), ("g0/2", None), ("g0/3", None)],
    );
    device(&mut network, "A", DeviceKind::Host, &[("eth0", Some("10.0.0.10")), ("eth1", None)]);
    device(&mut network, "B", DeviceKind::Host, &[("eth0", Some("10.0.0.11")), ("eth1", None)]);
    device(&mut network, "C", DeviceKind::Host, &[("eth0", Some("10.0.0.12"))]);
    links(
        &mut network,
        &[
            ("S", "g0/1", "A", "eth0"),
            ("S", "g0/2", "B", "eth0"),
            ("S", "g0/3", "C", "eth0"),
            ("A", "eth1", "B", "eth1"),
        ],
    );
    network
}
