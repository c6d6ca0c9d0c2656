#![warn(missing_docs)]

//! sluice-core: foundational types shared by every sluice crate.
//!
//! This crate provides the minimal set of utilities the link layer builds on:
//! - Configuration types
//! - Error handling
//! - Protocol constants
//! - Delivery tag bytes
//!
//! Protocol vocabulary lives in `sluice-protocol`, link state and credit
//! accounting in `sluice-link`, and session/connection hosting in `sluice-host`.

/// Protocol constants shared across layers.
pub mod constants {
    /// Maximum length of a delivery tag in octets (AMQP 1.0, 2.8.7).
    pub const MAX_DELIVERY_TAG_LENGTH: usize = 32;
    /// Delivery count a sender starts from when the application does not choose one.
    pub const DEFAULT_INITIAL_DELIVERY_COUNT: u32 = 0;
    /// Largest link handle a session accepts by default (AMQP `handle-max` default).
    pub const DEFAULT_HANDLE_MAX: u32 = u32::MAX;
    /// Initial capacity of a connection's work set.
    pub const DEFAULT_WORK_SET_CAPACITY: usize = 256;
}

/// Configuration options for links, sessions and connections.
pub mod config;
/// Error types and results.
pub mod error;
/// Shared, reference-counted delivery tag bytes.
pub mod tag;

pub use config::Config;
pub use error::{ErrorKind, InvalidArgumentKind, Result};
pub use tag::DeliveryTag;
