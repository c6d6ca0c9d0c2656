use sluice_protocol::EndpointState;

/// Lifecycle shared by connections, sessions and links.
///
/// Local state moves `Uninitialized -> Active -> Closed` through `open` and
/// `close`; remote state follows the peer's frames.
pub trait Endpoint {
    /// Our side of the endpoint.
    fn local_state(&self) -> EndpointState;

    /// The peer's side, as last reported.
    fn remote_state(&self) -> EndpointState;

    /// Opens the local side.
    fn open(&mut self);

    /// Closes the local side. No effect once closed.
    fn close(&mut self);
}
