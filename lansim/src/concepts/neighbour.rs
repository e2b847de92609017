use std::fmt::{Display, Formatter};

/// One end of a link, named by device hostname and interface name.
///
/// A neighbour entry on an interface is the remote endpoint of one of its links. It is a
/// reference by name only, the remote device owns the interface it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub device: String,
    pub interface: String,
}

impl Endpoint {
    pub fn new(device: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            interface: interface.into(),
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.device, self.interface)
    }
}
