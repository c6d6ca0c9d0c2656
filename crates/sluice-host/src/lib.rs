#![warn(missing_docs)]

//! sluice-host: sessions and connections hosting sluice links.
//!
//! A [`Connection`] owns its [`Session`]s, each of which owns an arena of
//! links. The connection routes decoded frames to links by name, pumps their
//! outbound performatives and keeps the work set links report into.

/// Connection: session ownership, frame routing and the work set.
pub mod connection;
/// Session: link arena and state filters.
pub mod session;
/// Ordered, de-duplicated work set.
pub mod work_set;

pub use connection::{Connection, OutboundFrame};
pub use session::Session;
pub use work_set::WorkSet;
