use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use crate::containers::List;
use crate::feedback::ValidationError;
use crate::util::parse_address;

/// An IPv4 prefix, kept with its host bits cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix {
    network: Ipv4Addr,
    length: u8,
}

impl Prefix {
    /// Builds a prefix from an address and a dotted-quad subnet mask
    ///
    /// # Examples
    ///
    /// ```
    /// use lansim::concepts::policy::Prefix;
    /// let prefix = Prefix::parse("10.0.7.9", "255.255.0.0").unwrap();
    /// assert_eq!(prefix.to_string(), "10.0.0.0/16");
    /// assert_eq!(prefix.mask().to_string(), "255.255.0.0");
    ///
    /// assert!(Prefix::parse("10.0.0.0", "255.0.255.0").is_err());
    /// assert!(Prefix::parse("10.0.0", "255.0.0.0").is_err());
    /// ```
    pub fn parse(address: &str, mask: &str) -> Result<Self, ValidationError> {
        let address = parse_address(address)?;
        let bits = u32::from(parse_address(mask)?);
        let length = bits.leading_ones();
        if bits.checked_shl(length).unwrap_or(0) != 0 {
            return Err(ValidationError::InvalidMask(mask.to_string()));
        }
        Ok(Prefix::new(address, length as u8))
    }

    pub fn new(address: Ipv4Addr, length: u8) -> Self {
        let length = length.min(32);
        Prefix {
            network: Ipv4Addr::from(u32::from(address) & mask_bits(length)),
            length,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }
    pub fn length(&self) -> u8 {
        self.length
    }
    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(mask_bits(self.length))
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & mask_bits(self.length) == u32::from(self.network)
    }
}

fn mask_bits(length: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(length)).unwrap_or(0)
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    Block,
    /// relayed packets must still carry at least this TTL
    TtlMin(u8),
}

/// Policies set on one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub prefix: Prefix,
    pub block: bool,
    pub ttl_min: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Blocked,
    BelowTtlMin(u8),
}

/// Destination policies of a device, applied to the packets it relays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    rules: List<PolicyRule>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `action` to the rule for `prefix`, creating the rule if needed
    pub fn set(&mut self, prefix: Prefix, action: PolicyAction) {
        if !self.rules.contains(|rule| rule.prefix == prefix) {
            self.rules.push_back(PolicyRule {
                prefix,
                block: false,
                ttl_min: None,
            });
        }
        if let Some(rule) = self.rules.iter_mut().find(|rule| rule.prefix == prefix) {
            match action {
                PolicyAction::Block => rule.block = true,
                PolicyAction::TtlMin(min) => rule.ttl_min = Some(min),
            }
        }
    }

    /// Drops every policy of `prefix`, returns false if it had none
    pub fn unset(&mut self, prefix: Prefix) -> bool {
        self.rules.remove_first(|rule| rule.prefix == prefix).is_some()
    }

    pub fn rules(&self) -> &List<PolicyRule> {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every prefix containing `destination` contributes its policies. A block from any of
    /// them wins, otherwise the TTL floor of the longest such prefix applies.
    pub fn check(&self, destination: Ipv4Addr, ttl: u8) -> Verdict {
        let mut matching: Vec<&PolicyRule> = self
            .rules
            .iter()
            .filter(|rule| rule.prefix.contains(destination))
            .collect();
        if matching.iter().any(|rule| rule.block) {
            return Verdict::Blocked;
        }
        matching.sort_by_key(|rule| rule.prefix.length());
        let floor = matching.iter().rev().find_map(|rule| rule.ttl_min);
        match floor {
            Some(min) if ttl < min => Verdict::BelowTtlMin(min),
            _ => Verdict::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(address: &str, mask: &str) -> Prefix {
        Prefix::parse(address, mask).unwrap()
    }

    #[test]
    fn masks_must_be_contiguous() {
        assert_eq!(prefix("0.0.0.0", "0.0.0.0").length(), 0);
        assert_eq!(prefix("10.1.2.3", "255.255.255.255").to_string(), "10.1.2.3/32");
        assert_eq!(
            Prefix::parse("10.0.0.0", "255.255.0.255"),
            Err(ValidationError::InvalidMask("255.255.0.255".into()))
        );
        assert!(prefix("0.0.0.0", "0.0.0.0").contains(Ipv4Addr::new(8, 8, 8, 8)));
    }

    #[test]
    fn longest_ttl_floor_applies() {
        let mut table = PolicyTable::new();
        table.set(prefix("10.0.0.0", "255.255.0.0"), PolicyAction::TtlMin(3));
        table.set(prefix("10.0.5.0", "255.255.255.0"), PolicyAction::TtlMin(1));

        assert_eq!(table.check(Ipv4Addr::new(10, 0, 5, 1), 2), Verdict::Pass);
        assert_eq!(table.check(Ipv4Addr::new(10, 0, 6, 1), 2), Verdict::BelowTtlMin(3));
        assert_eq!(table.check(Ipv4Addr::new(10, 0, 6, 1), 3), Verdict::Pass);
        assert_eq!(table.check(Ipv4Addr::new(172, 16, 0, 1), 1), Verdict::Pass);
    }

    #[test]
    fn block_overrides_and_unset_clears() {
        let mut table = PolicyTable::new();
        let wide = prefix("10.0.0.0", "255.0.0.0");
        table.set(wide, PolicyAction::TtlMin(5));
        table.set(wide, PolicyAction::Block);
        table.set(prefix("10.0.2.0", "255.255.255.0"), PolicyAction::TtlMin(1));
        assert_eq!(table.rules().len(), 2);
        assert_eq!(table.check(Ipv4Addr::new(10, 0, 2, 9), 64), Verdict::Blocked);

        assert!(table.unset(wide));
        assert!(!table.unset(wide));
        assert_eq!(table.check(Ipv4Addr::new(10, 0, 2, 9), 64), Verdict::Pass);
    }
}
