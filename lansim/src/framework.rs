/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimParams {
    /// TTL given to packets sent without an explicit one
    pub default_ttl: u8,
    /// Largest TTL the shell accepts
    pub max_ttl: u8,
    /// Records kept per device before the oldest is discarded
    pub error_log_capacity: usize,
    pub max_hostname_len: usize,
    /// Upper bound on `tick <count>`
    pub max_ticks_per_command: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            default_ttl: 64,
            max_ttl: u8::MAX,
            error_log_capacity: 1000,
            max_hostname_len: 64,
            max_ticks_per_command: 10_000,
        }
    }
}
