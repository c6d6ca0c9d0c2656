#![warn(missing_docs)]

//! Sluice: a small public API facade for the workspace.
//!
//! This crate re-exports the types most applications need to drive AMQP 1.0
//! links on top of their own frame codec:
//!
//! - Connections, sessions and links (`Connection`, `Session`, `Link`)
//! - Deliveries and their states (`Delivery`, `DeliveryId`, `DeliveryState`)
//! - Link vocabulary (`Role`, settle modes, termini, performatives)
//! - Core configuration and errors (`Config`, `ErrorKind`)
//!
//! Example
//! ```
//! use sluice::prelude::*;
//!
//! let mut connection = Connection::new(&Config::default());
//! let session = connection.session();
//! let sender = connection.session_mut(session).unwrap().sender("events").unwrap();
//!
//! let link = connection.link_mut(sender).unwrap();
//! link.set_target(Some(Target::new("queue://events"))).unwrap();
//! link.open();
//! link.delivery("tag-1").unwrap();
//! link.advance();
//!
//! // The Attach goes out at once; the Transfer waits for the peer's credit.
//! let frames = connection.pump();
//! assert_eq!(frames.len(), 1);
//! assert!(matches!(frames[0].frame.body, Performative::Attach(_)));
//! ```

// Core config and errors
pub use sluice_core::{Config, DeliveryTag, ErrorKind, InvalidArgumentKind, Result};
// Host: connections and sessions
pub use sluice_host::{Connection, OutboundFrame, Session};
// Link: endpoint state, deliveries and credit
pub use sluice_link::{
    Delivery, DeliveryId, Endpoint, Link, LinkHandle, LinkStatistics, SessionHandle, WorkEvent,
    WorkKind, WorkReport,
};
// Protocol: link vocabulary and performatives
pub use sluice_protocol::{
    Attach, DeliveryState, Detach, Disposition, EndpointState, EndpointStates, ErrorCondition,
    Fields, Flow, Frame, Performative, ReceiverSettleMode, Role, SenderSettleMode, Source, Symbol,
    Target, Transfer, Value,
};

/// Glob-importable set of the types most programs use.
pub mod prelude {
    pub use crate::{
        Config, Connection, Delivery, DeliveryId, DeliveryState, Endpoint, EndpointState,
        EndpointStates, ErrorKind, Frame, Link, LinkHandle, Performative, ReceiverSettleMode,
        Role, SenderSettleMode, Source, Target,
    };
}
