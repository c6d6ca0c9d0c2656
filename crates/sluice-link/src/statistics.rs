//! Per-link delivery counters.

/// Counters for one link endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStatistics {
    /// Deliveries created locally
    pub deliveries_created: u64,
    /// Transfers handed to the transport
    pub transfers_sent: u64,
    /// Transfer frames received from the peer
    pub transfers_received: u64,
    /// Deliveries settled locally
    pub deliveries_settled: u64,
    /// Deliveries freed from the delivery list
    pub deliveries_freed: u64,
    /// Dispositions sent to the peer
    pub dispositions_sent: u64,
    /// Peer frames dropped as inconsistent (unknown tags, impossible flows)
    pub frames_ignored: u64,
}

impl LinkStatistics {
    /// Deliveries settled locally but still held by the link.
    pub fn settled_outstanding(&self) -> u64 {
        self.deliveries_settled.saturating_sub(self.deliveries_freed)
    }

    /// Resets all statistics counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_initialized_to_zero() {
        let stats = LinkStatistics::default();
        assert_eq!(stats.deliveries_created, 0);
        assert_eq!(stats.frames_ignored, 0);
        assert_eq!(stats.settled_outstanding(), 0);
    }

    #[test]
    fn test_statistics_reset() {
        let mut stats = LinkStatistics::default();
        stats.deliveries_settled = 5;
        stats.deliveries_freed = 3;
        assert_eq!(stats.settled_outstanding(), 2);

        stats.reset();
        assert_eq!(stats, LinkStatistics::default());
    }
}
