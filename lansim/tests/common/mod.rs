#![allow(dead_code)]

pub mod topologies;

use lansim::network::Network;
use lansim::sim::TickEvent;

/// Runs `n` ticks and returns every event in order
pub fn tick_n(network: &mut Network, n: usize) -> Vec<TickEvent> {
    (0..n).flat_map(|_| network.tick()).collect()
}

pub fn render(events: &[TickEvent]) -> Vec<String> {
    events.iter().map(ToString::to_string).collect()
}

pub fn neighbours_of(network: &Network, device: &str, interface: &str) -> Vec<String> {
    network
        .device(device)
        .and_then(|d| d.interface(interface))
        .map(|itf| itf.neighbours().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}
