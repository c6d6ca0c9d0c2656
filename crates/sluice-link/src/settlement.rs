use sluice_core::error::{ErrorKind, Result};
use sluice_protocol::{ReceiverSettleMode, SenderSettleMode};
use tracing::trace;

/// Rejects a mutation of a local-only field once the endpoint is open.
pub(crate) fn ensure_unsealed(sealed: bool, field: &'static str) -> Result<()> {
    if sealed {
        return Err(ErrorKind::ContractViolation { field });
    }
    Ok(())
}

/// Local and remote settle modes of a link.
///
/// Local modes are fixed once the link opens; remote modes are whatever the
/// peer's Attach carried and stay unset until it arrives.
#[derive(Debug, Clone, Default)]
pub struct SettlementModes {
    sender: SenderSettleMode,
    receiver: ReceiverSettleMode,
    remote_sender: Option<SenderSettleMode>,
    remote_receiver: Option<ReceiverSettleMode>,
    sealed: bool,
}

impl SettlementModes {
    /// Creates the default negotiation: mixed sender, first receiver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Local sender settle mode.
    pub fn sender_settle_mode(&self) -> SenderSettleMode {
        self.sender
    }

    /// Local receiver settle mode.
    pub fn receiver_settle_mode(&self) -> ReceiverSettleMode {
        self.receiver
    }

    /// Sets the local sender settle mode. Fails once the link is open.
    pub fn set_sender_settle_mode(&mut self, mode: SenderSettleMode) -> Result<()> {
        ensure_unsealed(self.sealed, "sender settle mode")?;
        self.sender = mode;
        Ok(())
    }

    /// Sets the local receiver settle mode. Fails once the link is open.
    pub fn set_receiver_settle_mode(&mut self, mode: ReceiverSettleMode) -> Result<()> {
        ensure_unsealed(self.sealed, "receiver settle mode")?;
        self.receiver = mode;
        Ok(())
    }

    /// Sender settle mode announced by the peer.
    pub fn remote_sender_settle_mode(&self) -> Option<SenderSettleMode> {
        self.remote_sender
    }

    /// Receiver settle mode announced by the peer.
    pub fn remote_receiver_settle_mode(&self) -> Option<ReceiverSettleMode> {
        self.remote_receiver
    }

    /// True once the local modes are frozen.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub(crate) fn record_remote(&mut self, sender: SenderSettleMode, receiver: ReceiverSettleMode) {
        trace!(?sender, ?receiver, "peer settle modes");
        self.remote_sender = Some(sender);
        self.remote_receiver = Some(receiver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_unset_remote() {
        let modes = SettlementModes::new();
        assert_eq!(modes.sender_settle_mode(), SenderSettleMode::Mixed);
        assert_eq!(modes.receiver_settle_mode(), ReceiverSettleMode::First);
        assert_eq!(modes.remote_sender_settle_mode(), None);
        assert_eq!(modes.remote_receiver_settle_mode(), None);
    }

    #[test]
    fn test_setters_fail_after_seal() {
        let mut modes = SettlementModes::new();
        modes.set_sender_settle_mode(SenderSettleMode::Settled).unwrap();
        modes.seal();

        let err = modes.set_receiver_settle_mode(ReceiverSettleMode::Second).unwrap_err();
        assert_eq!(err, ErrorKind::ContractViolation { field: "receiver settle mode" });
        assert_eq!(modes.sender_settle_mode(), SenderSettleMode::Settled);
        assert_eq!(modes.receiver_settle_mode(), ReceiverSettleMode::First);
    }

    #[test]
    fn test_remote_modes_do_not_touch_local() {
        let mut modes = SettlementModes::new();
        modes.seal();
        modes.record_remote(SenderSettleMode::Unsettled, ReceiverSettleMode::Second);

        assert_eq!(modes.remote_sender_settle_mode(), Some(SenderSettleMode::Unsettled));
        assert_eq!(modes.remote_receiver_settle_mode(), Some(ReceiverSettleMode::Second));
        assert_eq!(modes.sender_settle_mode(), SenderSettleMode::Mixed);
    }
}
