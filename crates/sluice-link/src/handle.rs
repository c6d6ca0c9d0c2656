use std::fmt;

/// Non-owning reference to a session within a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionHandle(usize);

impl SessionHandle {
    /// Creates a handle for the session at `index`.
    pub fn new(index: usize) -> Self {
        SessionHandle(index)
    }

    /// Position of the session within its connection.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Non-owning reference to a link: its session plus its position in that
/// session's link table.
///
/// Links never hold references to their owners; they carry this handle and
/// the host resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LinkHandle {
    session: SessionHandle,
    index: usize,
}

impl LinkHandle {
    /// Creates a handle for link `index` of `session`.
    pub fn new(session: SessionHandle, index: usize) -> Self {
        Self { session, index }
    }

    /// The session owning the link.
    pub fn session(self) -> SessionHandle {
        self.session
    }

    /// Position of the link within its session.
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for LinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session.0, self.index)
    }
}
