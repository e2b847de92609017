use crate::concepts::packet::Packet;
use crate::containers::List;

/// Snapshot of a packet at the moment it was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub packet: Packet,
    pub tick: u64,
}

impl HistoryEntry {
    pub fn ttl_at_arrival(&self) -> u8 {
        self.packet.ttl
    }

    pub fn path(&self) -> &List<String> {
        self.packet.path()
    }
}
