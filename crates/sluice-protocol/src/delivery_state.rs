use crate::value::{Fields, Symbol};

/// Error carried by a rejected outcome or a closing Detach (AMQP 1.0, 2.8.14).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCondition {
    /// Symbolic error condition, e.g. `amqp:link:detach-forced`
    pub condition: Symbol,
    /// Human readable description
    pub description: Option<String>,
    /// Additional diagnostic information
    pub info: Option<Fields>,
}

impl ErrorCondition {
    /// Creates an error condition with only a condition symbol.
    pub fn new(condition: impl Into<Symbol>) -> Self {
        Self { condition: condition.into(), description: None, info: None }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Transfer/disposition state of a delivery.
///
/// An absent state (no disposition yet) is expressed as `Option::None` by the
/// holders of this type rather than as a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryState {
    /// Partial receipt, used for resumption (AMQP 1.0, 3.4.1)
    Received {
        /// Section the receiver has reached
        section_number: u32,
        /// Offset within that section
        section_offset: u64,
    },
    /// Message processed successfully
    Accepted,
    /// Message invalid and will not be processed
    Rejected {
        /// Why the message was rejected
        error: Option<ErrorCondition>,
    },
    /// Message was not and will not be processed
    Released,
    /// Message modified but not processed
    Modified {
        /// Count the delivery as a failed attempt
        delivery_failed: bool,
        /// Do not redeliver to this link
        undeliverable_here: bool,
        /// Annotations to merge into the message
        message_annotations: Option<Fields>,
    },
    /// State defined by another layer, e.g. transactional states
    Other {
        /// Descriptor of the foreign state
        descriptor: Symbol,
        /// Its fields, if any
        fields: Option<Fields>,
    },
}

impl DeliveryState {
    /// Returns true if the state is a terminal outcome.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            DeliveryState::Accepted
                | DeliveryState::Rejected { .. }
                | DeliveryState::Released
                | DeliveryState::Modified { .. }
        )
    }
}
