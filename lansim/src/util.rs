use std::net::Ipv4Addr;

use crate::feedback::ValidationError;

/// Parses a dotted-quad IPv4 address, four groups of one to three digits with values 0 to 255
///
/// # Arguments
///
/// * `text`: the address as typed
///
/// returns: Result<Ipv4Addr, ValidationError>
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// assert_eq!(lansim::util::parse_address("10.0.0.1"), Ok(Ipv4Addr::new(10, 0, 0, 1)));
/// assert_eq!(lansim::util::parse_address("192.168.001.010"), Ok(Ipv4Addr::new(192, 168, 1, 10)));
///
/// assert!(lansim::util::parse_address("256.0.0.1").is_err());
/// assert!(lansim::util::parse_address("10.0.0").is_err());
/// assert!(lansim::util::parse_address("10.0.0.1.5").is_err());
/// assert!(lansim::util::parse_address("a.b.c.d").is_err());
/// ```
pub fn parse_address(text: &str) -> Result<Ipv4Addr, ValidationError> {
    let invalid = || ValidationError::InvalidAddress(text.to_string());
    let mut octets = [0u8; 4];
    let mut groups = text.split('.');
    for octet in octets.iter_mut() {
        let group = groups.next().ok_or_else(invalid)?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *octet = group.parse::<u8>().map_err(|_| invalid())?;
    }
    if groups.next().is_some() {
        return Err(invalid());
    }
    Ok(Ipv4Addr::from(octets))
}

/// Parses a TTL given on the command line, which must lie in `1..=max`
///
/// # Examples
///
/// ```
/// assert_eq!(lansim::util::parse_ttl("2", 255), Ok(2));
/// assert!(lansim::util::parse_ttl("0", 255).is_err());
/// assert!(lansim::util::parse_ttl("256", 255).is_err());
/// assert!(lansim::util::parse_ttl("80", 64).is_err());
/// assert!(lansim::util::parse_ttl("-1", 255).is_err());
/// ```
pub fn parse_ttl(text: &str, max: u8) -> Result<u8, ValidationError> {
    match text.parse::<u8>() {
        Ok(ttl) if (1..=max).contains(&ttl) => Ok(ttl),
        _ => Err(ValidationError::InvalidTtl {
            value: text.to_string(),
            max,
        }),
    }
}

/// Hostnames are alphanumeric, with `-` or `_` allowed anywhere but the ends
///
/// # Examples
///
/// ```
/// assert!(lansim::util::is_valid_hostname("Router1", 64));
/// assert!(lansim::util::is_valid_hostname("core-sw_2", 64));
///
/// assert!(!lansim::util::is_valid_hostname("", 64));
/// assert!(!lansim::util::is_valid_hostname("-edge", 64));
/// assert!(!lansim::util::is_valid_hostname("edge router", 64));
/// assert!(!lansim::util::is_valid_hostname("abcdef", 5));
/// ```
pub fn is_valid_hostname(name: &str, max_len: usize) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    let last = name.chars().last().unwrap_or(first);
    name.len() <= max_len
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Interface names follow the IOS short forms: `g0/0`, `f0/1`, `s0/0`, or `eth0`
///
/// # Examples
///
/// ```
/// assert!(lansim::util::is_valid_interface_name("g0/0"));
/// assert!(lansim::util::is_valid_interface_name("f1/12"));
/// assert!(lansim::util::is_valid_interface_name("eth3"));
///
/// assert!(!lansim::util::is_valid_interface_name("g0"));
/// assert!(!lansim::util::is_valid_interface_name("x0/0"));
/// assert!(!lansim::util::is_valid_interface_name("eth"));
/// assert!(!lansim::util::is_valid_interface_name("g0/0/1"));
/// ```
pub fn is_valid_interface_name(name: &str) -> bool {
    fn digits(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }
    if let Some(index) = name.strip_prefix("eth") {
        return digits(index);
    }
    match name.strip_prefix(['g', 'f', 's']) {
        Some(rest) => match rest.split_once('/') {
            Some((slot, port)) => digits(slot) && digits(port),
            None => false,
        },
        None => false,
    }
}
