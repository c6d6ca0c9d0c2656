/// Role of a link endpoint (AMQP 1.0, 2.8.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The endpoint transmits deliveries and consumes credit
    Sender,
    /// The endpoint accepts deliveries and grants credit
    Receiver,
}

impl Role {
    /// Returns the role the peer's half of the link plays.
    pub fn opposite(self) -> Role {
        match self {
            Role::Sender => Role::Receiver,
            Role::Receiver => Role::Sender,
        }
    }

    /// Returns true for [`Role::Sender`].
    pub fn is_sender(self) -> bool {
        matches!(self, Role::Sender)
    }

    /// Returns true for [`Role::Receiver`].
    pub fn is_receiver(self) -> bool {
        matches!(self, Role::Receiver)
    }
}

/// Settlement policy for a sender (AMQP 1.0, 2.8.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SenderSettleMode {
    /// The sender sends all deliveries unsettled
    Unsettled,
    /// The sender sends all deliveries settled
    Settled,
    /// The sender may send a mixture of settled and unsettled deliveries
    #[default]
    Mixed,
}

/// Settlement policy for a receiver (AMQP 1.0, 2.8.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReceiverSettleMode {
    /// The receiver settles spontaneously without waiting for the sender
    #[default]
    First,
    /// The receiver only settles after the sender has settled
    Second,
}
