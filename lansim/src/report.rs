//! Text output for the `show` family of commands. Reports only read the network.

use std::fmt::Write;

use crate::concepts::packet::Packet;
use crate::feedback::StructuralError;
use crate::network::Network;

pub fn device_list(network: &Network) -> String {
    if network.devices().is_empty() {
        return "No devices in network".to_string();
    }
    let mut out = String::from("Devices in network:");
    for device in network.devices() {
        let _ = write!(out, "\n- {} ({}, {})", device.hostname(), device.kind(), device.status());
    }
    out
}

/// Delivered packets, most recent first
pub fn history(network: &Network, device: &str) -> Result<String, StructuralError> {
    let history = network.history(device)?;
    if history.is_empty() {
        return Ok(format!("No message history for {device}"));
    }
    let mut out = format!("Message history for {device}:");
    for (i, entry) in history.iter().enumerate() {
        let packet = &entry.packet;
        let _ = write!(
            out,
            "\n{}) From {} to {}: \"{}\" | TTL at arrival: {} | Path: {}",
            i + 1,
            source_label(packet),
            packet.destination,
            packet.message,
            entry.ttl_at_arrival(),
            packet.route_trace()
        );
    }
    Ok(out)
}

fn source_label(packet: &Packet) -> String {
    match packet.source_address {
        Some(address) => address.to_string(),
        None => packet.source.clone(),
    }
}

pub fn queues(network: &Network, device: &str) -> Result<String, StructuralError> {
    let mut out = format!("Queue status for {device}:");
    for state in network.queue_state(device)? {
        let _ = write!(out, "\nInterface {}:", state.interface);
        for (label, queue) in [("Outgoing", state.outbound), ("Incoming", state.inbound)] {
            let _ = write!(out, "\n  {label}: {} packets", queue.len());
            if !queue.is_empty() {
                let ids: Vec<String> = queue.iter().map(|p| p.id.to_string()).collect();
                let _ = write!(out, " [{}]", ids.join(", "));
            }
        }
    }
    Ok(out)
}

pub fn interfaces(network: &Network, device: &str) -> Result<String, StructuralError> {
    let mut out = format!("Interfaces for {device}:");
    for itf in network.interfaces(device)? {
        let address = itf
            .address()
            .map_or_else(|| "unassigned".to_string(), |a| a.to_string());
        let links: Vec<String> = itf.neighbours().iter().map(ToString::to_string).collect();
        let links = if links.is_empty() {
            "none".to_string()
        } else {
            links.join(", ")
        };
        let _ = write!(
            out,
            "\n  {}: {} | IP: {} | Connected to: {}",
            itf.name(),
            itf.admin_state(),
            address,
            links
        );
    }
    Ok(out)
}

pub fn statistics(network: &Network) -> String {
    let stats = network.statistics();
    let mut out = String::from("Network Statistics:");
    let _ = write!(out, "\nTicks: {}", network.current_tick());
    let _ = write!(out, "\nTotal packets sent: {}", stats.packets_sent);
    let _ = write!(out, "\nDelivered: {}", stats.delivered);
    let _ = write!(out, "\nForwarded: {}", stats.forwarded);
    let _ = write!(out, "\nDropped: {}", stats.dropped);
    let _ = write!(out, "\nDropped (TTL): {}", stats.dropped_ttl);
    let _ = write!(out, "\nDropped (policy): {}", stats.dropped_policy);
    let _ = write!(out, "\nAverage hops: {:.2}", stats.average_hops());
    if let Some((device, count)) = stats.top_talker() {
        let _ = write!(out, "\nTop talker: {device} ({count} packets transmitted)");
    }
    out
}

/// The last `limit` records of the device's error log, oldest first
pub fn error_log(
    network: &Network,
    device: &str,
    limit: Option<usize>,
) -> Result<String, StructuralError> {
    let log = network.error_log(device)?;
    if log.is_empty() {
        return Ok("No errors logged".to_string());
    }
    let skip = limit.map_or(0, |limit| log.len().saturating_sub(limit));
    let mut out = String::from("Error Log:");
    for record in log.iter().skip(skip) {
        let _ = write!(out, "\n[tick {}] {}: {}", record.tick, record.kind, record.message);
        if let Some(command) = &record.command {
            let _ = write!(out, " (Command: {command})");
        }
    }
    Ok(out)
}

/// IOS-style configuration of one device
pub fn running_config(network: &Network, device: &str) -> Result<String, StructuralError> {
    let Some(dev) = network.device(device) else {
        return Err(StructuralError::UnknownDevice(device.to_string()));
    };
    let mut out = String::from("Building configuration...\n!");
    let _ = write!(out, "\nhostname {}", dev.hostname());
    let _ = write!(out, "\n! type {}, {}", dev.kind(), dev.status());
    for itf in dev.interfaces() {
        let _ = write!(out, "\n!\ninterface {}", itf.name());
        for remote in itf.neighbours().iter() {
            let _ = write!(out, "\n description connected to {remote}");
        }
        match itf.address() {
            Some(address) => {
                let _ = write!(out, "\n ip address {address}");
            }
            None => out.push_str("\n no ip address"),
        }
        out.push_str(if itf.is_up() { "\n no shutdown" } else { "\n shutdown" });
    }
    if !dev.policies().is_empty() {
        out.push_str("\n!");
    }
    for rule in dev.policies().rules() {
        let (address, mask) = (rule.prefix.network(), rule.prefix.mask());
        if rule.block {
            let _ = write!(out, "\npolicy set {address} {mask} block");
        }
        if let Some(min) = rule.ttl_min {
            let _ = write!(out, "\npolicy set {address} {mask} ttl-min {min}");
        }
    }
    out.push_str("\n!\nend");
    Ok(out)
}

pub fn policies(network: &Network, device: &str) -> Result<String, StructuralError> {
    let table = network.policies(device)?;
    if table.is_empty() {
        return Ok(format!("No prefix policies configured on {device}"));
    }
    let mut out = format!("Prefix policies for {device}:");
    for rule in table.rules() {
        let mut settings = Vec::new();
        if rule.block {
            settings.push("block".to_string());
        }
        if let Some(min) = rule.ttl_min {
            settings.push(format!("ttl-min={min}"));
        }
        let _ = write!(out, "\n  {} {{{}}}", rule.prefix, settings.join(", "));
    }
    Ok(out)
}
