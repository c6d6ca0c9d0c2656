use bitflags::bitflags;

/// Endpoint lifecycle state.
///
/// Tracked independently for the local and the remote half of every link,
/// session and connection: local state moves when the application opens or
/// closes the endpoint, remote state when the peer's frames arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EndpointState {
    /// Created but not yet opened
    #[default]
    Uninitialized,

    /// Opened (Attach/Begin/Open sent or received)
    Active,

    /// Closed (final Detach/End/Close sent or received)
    Closed,
}

impl EndpointState {
    /// Returns true if the endpoint has been opened and not yet closed
    pub fn is_active(&self) -> bool {
        matches!(self, EndpointState::Active)
    }

    /// Returns true if the endpoint has not been opened yet
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, EndpointState::Uninitialized)
    }

    /// Returns true if the endpoint has been closed
    pub fn is_closed(&self) -> bool {
        matches!(self, EndpointState::Closed)
    }
}

bitflags! {
    /// A set of endpoint states, used to filter endpoints by their
    /// (local, remote) state pair.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EndpointStates: u8 {
        /// Matches [`EndpointState::Uninitialized`].
        const UNINITIALIZED = 1 << 0;

        /// Matches [`EndpointState::Active`].
        const ACTIVE = 1 << 1;

        /// Matches [`EndpointState::Closed`].
        const CLOSED = 1 << 2;

        /// Matches every state.
        const ANY = Self::UNINITIALIZED.bits() | Self::ACTIVE.bits() | Self::CLOSED.bits();
    }
}

impl EndpointStates {
    /// Returns true if `state` is a member of this set.
    pub fn matches(&self, state: EndpointState) -> bool {
        self.contains(state.into())
    }
}

impl From<EndpointState> for EndpointStates {
    fn from(state: EndpointState) -> Self {
        match state {
            EndpointState::Uninitialized => EndpointStates::UNINITIALIZED,
            EndpointState::Active => EndpointStates::ACTIVE,
            EndpointState::Closed => EndpointStates::CLOSED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_set_membership() {
        let set = EndpointStates::UNINITIALIZED | EndpointStates::CLOSED;
        assert!(set.matches(EndpointState::Uninitialized));
        assert!(!set.matches(EndpointState::Active));
        assert!(set.matches(EndpointState::Closed));

        assert!(!EndpointStates::empty().matches(EndpointState::Active));
        assert!(EndpointStates::ANY.matches(EndpointState::Active));
        assert_eq!(EndpointStates::ANY, EndpointStates::all());
    }

    #[test]
    fn test_state_set_from_state() {
        assert_eq!(EndpointStates::from(EndpointState::Active), EndpointStates::ACTIVE);
        assert_eq!(EndpointStates::default(), EndpointStates::empty());
    }
}
