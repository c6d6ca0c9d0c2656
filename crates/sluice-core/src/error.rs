//! Error types returned synchronously by link, session and connection calls.
//!
//! Nothing here is fatal to a connection: the embedding layer decides whether
//! an error escalates. Peer misbehaviour (unknown tags, impossible flows) is not
//! represented as an error at all; it is logged and ignored where it is detected.

use thiserror::Error;

/// Result alias used throughout the sluice crates.
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Errors that can be returned by the link layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A local-only field was mutated after the endpoint was opened.
    #[error("cannot change {field} after the link has been opened")]
    ContractViolation {
        /// Name of the field the caller tried to change
        field: &'static str,
    },

    /// The caller supplied an argument the link cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(InvalidArgumentKind),

    /// The parameter combination is reserved and not implemented.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Specific reasons for an [`ErrorKind::InvalidArgument`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgumentKind {
    /// Another unsettled delivery on the link already uses this tag.
    #[error("delivery tag is already in use by an unsettled delivery")]
    DuplicateTag,

    /// The tag exceeds the configured maximum length.
    #[error("delivery tag of {len} octets exceeds the maximum of {max}")]
    TagTooLong {
        /// Length of the rejected tag
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// The link already holds the configured maximum of unsettled deliveries.
    #[error("link already holds {0} unsettled deliveries")]
    TooManyUnsettled(usize),

    /// The delivery identifier does not refer to a delivery on this link.
    #[error("no such delivery on this link")]
    UnknownDelivery,

    /// The link, session or connection handle does not resolve.
    #[error("no such endpoint")]
    UnknownEndpoint,

    /// A link with the same name already exists in the session.
    #[error("a link named {0:?} already exists in this session")]
    DuplicateLinkName(String),

    /// The session cannot host more links.
    #[error("session handle-max of {0} reached")]
    HandleMaxReached(u32),
}

impl From<InvalidArgumentKind> for ErrorKind {
    fn from(kind: InvalidArgumentKind) -> Self {
        ErrorKind::InvalidArgument(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ErrorKind::ContractViolation { field: "source" };
        assert_eq!(err.to_string(), "cannot change source after the link has been opened");

        let err: ErrorKind = InvalidArgumentKind::TagTooLong { len: 40, max: 32 }.into();
        assert_eq!(
            err.to_string(),
            "invalid argument: delivery tag of 40 octets exceeds the maximum of 32"
        );
    }
}
