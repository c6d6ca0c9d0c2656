#![warn(missing_docs)]

//! sluice-protocol: AMQP 1.0 link vocabulary and the abstract performatives
//! exchanged with the frame codec.
//!
//! No wire encoding lives here. The types describe what an Attach, Flow,
//! Transfer, Disposition or Detach carries once decoded, so the link layer can
//! be driven by any codec.

/// Link role and settle modes (AMQP 1.0, 2.8.1 - 2.8.3).
pub mod definitions;
/// Delivery states and outcomes (AMQP 1.0, 3.4).
pub mod delivery_state;
/// Local/remote endpoint lifecycle states and state filters.
pub mod endpoint_state;
/// Decoded link performatives and the frames that carry them.
pub mod performative;
/// Serial number arithmetic for delivery counts.
pub mod sequence;
/// Source and target terminus records (AMQP 1.0, 3.5).
pub mod terminus;
/// Symbols and the restricted value model used by properties maps.
pub mod value;

pub use definitions::{ReceiverSettleMode, Role, SenderSettleMode};
pub use delivery_state::{DeliveryState, ErrorCondition};
pub use endpoint_state::{EndpointState, EndpointStates};
pub use performative::{Attach, Detach, Disposition, Flow, Frame, Performative, Transfer};
pub use sequence::SequenceNo;
pub use terminus::{Source, Target, TerminusDurability, TerminusExpiryPolicy};
pub use value::{Fields, Symbol, Value};
