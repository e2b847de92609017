use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use crate::containers::List;
use crate::feedback::ValidationError;

/// Packet ids are assigned from a per-network counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(pub u64);

impl Display for PacketId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: PacketId,
    /// hostname of the originating device
    pub source: String,
    /// first addressed interface of the originating device
    pub source_address: Option<Ipv4Addr>,
    pub destination: Ipv4Addr,
    pub message: String,
    pub ttl: u8,
    pub original_ttl: u8,
    path: List<String>,
}

impl Packet {
    pub fn new(
        id: PacketId,
        source: impl Into<String>,
        source_address: Option<Ipv4Addr>,
        destination: Ipv4Addr,
        message: impl Into<String>,
        ttl: u8,
    ) -> Result<Self, ValidationError> {
        if ttl == 0 {
            return Err(ValidationError::InvalidTtl {
                value: ttl.to_string(),
                max: u8::MAX,
            });
        }
        let source = source.into();
        let mut path = List::new();
        path.push_back(source.clone());
        Ok(Packet {
            id,
            source,
            source_address,
            destination,
            message: message.into(),
            ttl,
            original_ttl: ttl,
            path,
        })
    }

    /// Crosses one link: the TTL drops by one and `device`, where the packet arrives, joins
    /// the path
    pub fn decrement_and_record(mut self, device: &str) -> Self {
        self.ttl = self.ttl.saturating_sub(1);
        self.path.push_back(device.to_string());
        self
    }

    pub fn is_expired(&self) -> bool {
        self.ttl == 0
    }

    pub fn path(&self) -> &List<String> {
        &self.path
    }

    /// Links crossed so far
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// The device the packet last arrived at
    pub fn location(&self) -> &str {
        self.path.back().map_or(self.source.as_str(), String::as_str)
    }

    /// The device the packet arrived from, `None` before the first hop
    pub fn previous_hop(&self) -> Option<&str> {
        let hops = self.hops();
        if hops == 0 {
            return None;
        }
        self.path.iter().nth(hops - 1).map(String::as_str)
    }

    pub fn route_trace(&self) -> String {
        self.path
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(ttl: u8) -> Packet {
        Packet::new(PacketId(1), "H", None, Ipv4Addr::new(10, 0, 0, 1), "hi", ttl).unwrap()
    }

    #[test]
    fn rejects_zero_ttl() {
        let result = Packet::new(PacketId(1), "H", None, Ipv4Addr::LOCALHOST, "hi", 0);
        assert!(matches!(result, Err(ValidationError::InvalidTtl { .. })));
    }

    #[test]
    fn path_starts_at_source() {
        let p = packet(2);
        assert_eq!(p.route_trace(), "H");
        assert_eq!(p.hops(), 0);
        assert_eq!(p.previous_hop(), None);
        assert_eq!(p.location(), "H");
    }

    #[test]
    fn hop_records_arriving_device() {
        let p = packet(2).decrement_and_record("S").decrement_and_record("R");
        assert_eq!(p.ttl, 0);
        assert_eq!(p.original_ttl, 2);
        assert_eq!(p.route_trace(), "H → S → R");
        assert_eq!(p.previous_hop(), Some("S"));
        assert_eq!(p.location(), "R");
        assert!(p.is_expired());
    }

    #[test]
    fn ttl_saturates() {
        let p = packet(1).decrement_and_record("R").decrement_and_record("S");
        assert_eq!(p.ttl, 0);
        assert_eq!(p.hops(), 2);
    }
}
