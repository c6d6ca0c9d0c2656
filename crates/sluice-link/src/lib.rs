#![warn(missing_docs)]

//! sluice-link: the endpoint of an AMQP 1.0 link.
//!
//! A [`Link`] owns its deliveries, negotiates settle modes and capabilities
//! with the peer and keeps credit accounting in step with the peer's view.
//! It has no I/O: decoded performatives go in through
//! [`Link::process_performative`], outbound ones come out of
//! [`Link::take_performatives`], and pending work is announced to the hosting
//! connection through a [`WorkNotifier`].

/// Offered/desired capabilities and link properties.
pub mod capabilities;
/// Credit, queue and drain accounting.
pub mod credit;
mod delivery;
/// Ordered delivery storage with a cursor.
pub mod delivery_list;
mod endpoint;
mod handle;
mod link;
/// FIFO of deliveries waiting for the transport.
pub mod pending_queue;
/// Settle mode negotiation.
pub mod settlement;
mod statistics;
/// Work notifications from links to their connection.
pub mod work;

pub use capabilities::Capabilities;
pub use credit::CreditController;
pub use delivery::{Delivery, DeliveryId};
pub use delivery_list::{CursorMove, DeliveryList};
pub use endpoint::Endpoint;
pub use handle::{LinkHandle, SessionHandle};
pub use link::Link;
pub use settlement::SettlementModes;
pub use statistics::LinkStatistics;
pub use work::{WorkEvent, WorkKind, WorkNotifier, WorkReport};
