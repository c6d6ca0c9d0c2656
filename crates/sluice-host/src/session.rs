use crossbeam_channel::Sender;
use sluice_core::{
    config::Config,
    error::{InvalidArgumentKind, Result},
};
use sluice_link::{Endpoint, Link, LinkHandle, SessionHandle, WorkNotifier, WorkReport};
use sluice_protocol::{EndpointState, EndpointStates, Role};
use tracing::debug;

/// A session within a connection: an arena of links.
///
/// Links are never removed, so a [`LinkHandle`] stays valid for the life of
/// the session; closed links are skipped by the state filters instead.
#[derive(Debug)]
pub struct Session {
    handle: SessionHandle,
    config: Config,
    local_state: EndpointState,
    remote_state: EndpointState,
    links: Vec<Link>,
    work_sender: Sender<WorkReport>,
}

impl Session {
    pub(crate) fn new(handle: SessionHandle, config: &Config, work_sender: Sender<WorkReport>) -> Self {
        Self {
            handle,
            config: config.clone(),
            local_state: EndpointState::Uninitialized,
            remote_state: EndpointState::Uninitialized,
            links: Vec::new(),
            work_sender,
        }
    }

    /// Handle of this session within its connection.
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    /// Creates a sending link named `name`.
    pub fn sender(&mut self, name: &str) -> Result<LinkHandle> {
        self.create_link(name, Role::Sender)
    }

    /// Creates a receiving link named `name`.
    pub fn receiver(&mut self, name: &str) -> Result<LinkHandle> {
        self.create_link(name, Role::Receiver)
    }

    pub(crate) fn create_link(&mut self, name: &str, role: Role) -> Result<LinkHandle> {
        if self.find(name).is_some() {
            return Err(InvalidArgumentKind::DuplicateLinkName(name.to_owned()).into());
        }
        // Handles run from 0 to handle_max inclusive.
        if self.links.len() as u64 > u64::from(self.config.handle_max) {
            return Err(InvalidArgumentKind::HandleMaxReached(self.config.handle_max).into());
        }

        let handle = LinkHandle::new(self.handle, self.links.len());
        let notifier = WorkNotifier::new(handle, self.work_sender.clone());
        self.links.push(Link::new(name, role, &self.config, notifier));
        debug!(link = name, %handle, ?role, "link created");
        Ok(handle)
    }

    /// Resolves a link of this session.
    pub fn link(&self, handle: LinkHandle) -> Option<&Link> {
        if handle.session() != self.handle {
            return None;
        }
        self.links.get(handle.index())
    }

    /// Resolves a link of this session for mutation.
    pub fn link_mut(&mut self, handle: LinkHandle) -> Option<&mut Link> {
        if handle.session() != self.handle {
            return None;
        }
        self.links.get_mut(handle.index())
    }

    /// Finds a link by name.
    pub fn find(&self, name: &str) -> Option<LinkHandle> {
        self.links.iter().find(|link| link.name() == name).map(Link::handle)
    }

    /// All links in creation order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// First link whose local and remote states are in the given sets.
    pub fn link_head(&self, local: EndpointStates, remote: EndpointStates) -> Option<LinkHandle> {
        self.scan(0, local, remote)
    }

    /// Next link after `after` whose local and remote states are in the
    /// given sets.
    pub fn next_link(
        &self,
        after: LinkHandle,
        local: EndpointStates,
        remote: EndpointStates,
    ) -> Option<LinkHandle> {
        if after.session() != self.handle {
            return None;
        }
        self.scan(after.index() + 1, local, remote)
    }

    fn scan(&self, from: usize, local: EndpointStates, remote: EndpointStates) -> Option<LinkHandle> {
        self.links
            .iter()
            .skip(from)
            .find(|link| local.matches(link.local_state()) && remote.matches(link.remote_state()))
            .map(Link::handle)
    }

    pub(crate) fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.iter_mut()
    }

    pub(crate) fn set_remote_state(&mut self, state: EndpointState) {
        self.remote_state = state;
    }
}

impl Endpoint for Session {
    fn local_state(&self) -> EndpointState {
        self.local_state
    }

    fn remote_state(&self) -> EndpointState {
        self.remote_state
    }

    fn open(&mut self) {
        if self.local_state.is_uninitialized() {
            self.local_state = EndpointState::Active;
        }
    }

    fn close(&mut self) {
        self.local_state = EndpointState::Closed;
    }
}
