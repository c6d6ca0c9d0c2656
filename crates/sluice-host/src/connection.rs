use crossbeam_channel::{unbounded, Receiver, Sender};
use sluice_core::{
    config::Config,
    error::{InvalidArgumentKind, Result},
};
use sluice_link::{Endpoint, Link, LinkHandle, SessionHandle, WorkEvent, WorkReport};
use sluice_protocol::{EndpointState, EndpointStates, Frame, Performative};
use tracing::{debug, trace, warn};

use crate::{session::Session, work_set::WorkSet};

/// A frame produced by [`Connection::pump`], addressed to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    /// Session the frame travels on
    pub session: SessionHandle,
    /// The frame itself
    pub frame: Frame,
}

/// A connection hosting sessions and their links.
///
/// The connection owns every session and link. Links report pending work
/// through a crossbeam channel; [`Connection::pump`] and the work accessors
/// fold those reports into an ordered, de-duplicated work set. Work for a
/// delivery is withdrawn when the delivery is freed.
#[derive(Debug)]
pub struct Connection {
    config: Config,
    local_state: EndpointState,
    remote_state: EndpointState,
    sessions: Vec<Session>,
    work_sender: Sender<WorkReport>,
    work_receiver: Receiver<WorkReport>,
    work: WorkSet,
    frames_ignored: u64,
}

impl Connection {
    /// Creates an unopened connection.
    pub fn new(config: &Config) -> Self {
        let (work_sender, work_receiver) = unbounded();
        Self {
            config: config.clone(),
            local_state: EndpointState::Uninitialized,
            remote_state: EndpointState::Uninitialized,
            sessions: Vec::new(),
            work_sender,
            work_receiver,
            work: WorkSet::new(config.work_set_capacity),
            frames_ignored: 0,
        }
    }

    /// Configuration shared by every session and link of the connection.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a new session.
    pub fn session(&mut self) -> SessionHandle {
        let handle = SessionHandle::new(self.sessions.len());
        self.sessions.push(Session::new(handle, &self.config, self.work_sender.clone()));
        debug!(session = handle.index(), "session created");
        handle
    }

    /// Resolves a session.
    pub fn get_session(&self, handle: SessionHandle) -> Option<&Session> {
        self.sessions.get(handle.index())
    }

    /// Resolves a session for mutation.
    pub fn session_mut(&mut self, handle: SessionHandle) -> Option<&mut Session> {
        self.sessions.get_mut(handle.index())
    }

    /// All sessions in creation order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    /// Resolves a link anywhere in the connection.
    pub fn link(&self, handle: LinkHandle) -> Option<&Link> {
        self.get_session(handle.session())?.link(handle)
    }

    /// Resolves a link anywhere in the connection for mutation.
    pub fn link_mut(&mut self, handle: LinkHandle) -> Option<&mut Link> {
        self.session_mut(handle.session())?.link_mut(handle)
    }

    /// First link, in session then link order, whose local and remote
    /// states are in the given sets.
    pub fn link_head(&self, local: EndpointStates, remote: EndpointStates) -> Option<LinkHandle> {
        self.sessions.iter().find_map(|session| session.link_head(local, remote))
    }

    /// Next link after `after` within the same session whose local and
    /// remote states are in the given sets.
    pub fn next_link(
        &self,
        after: LinkHandle,
        local: EndpointStates,
        remote: EndpointStates,
    ) -> Option<LinkHandle> {
        self.get_session(after.session())?.next_link(after, local, remote)
    }

    /// Peer frames dropped because no link could take them.
    pub fn frames_ignored(&self) -> u64 {
        self.frames_ignored
    }

    // Work set

    fn collect_work(&mut self) {
        for report in self.work_receiver.try_iter() {
            match report {
                WorkReport::Raised(event) => {
                    self.work.insert(event);
                }
                WorkReport::Withdrawn(event) => {
                    self.work.remove(event);
                }
            }
        }
    }

    /// Oldest pending work item.
    pub fn work_head(&mut self) -> Option<WorkEvent> {
        self.collect_work();
        self.work.head()
    }

    /// Removes and returns the oldest pending work item.
    pub fn next_work(&mut self) -> Option<WorkEvent> {
        self.collect_work();
        self.work.pop()
    }

    /// True if any work is pending.
    pub fn has_work(&mut self) -> bool {
        self.collect_work();
        !self.work.is_empty()
    }

    /// Removes and returns all pending work, oldest first.
    pub fn drain_work(&mut self) -> Vec<WorkEvent> {
        self.collect_work();
        self.work.drain()
    }

    // Frame plumbing

    /// Marks the peer's side of the connection open.
    pub fn remote_open(&mut self) {
        self.remote_state = EndpointState::Active;
    }

    /// Marks the peer's side of the connection closed.
    pub fn remote_close(&mut self) {
        self.remote_state = EndpointState::Closed;
    }

    /// Marks the peer's side of a session begun (`active`) or ended.
    pub fn remote_session_state(&mut self, session: SessionHandle, state: EndpointState) -> Result<()> {
        let session = self.session_mut(session).ok_or(InvalidArgumentKind::UnknownEndpoint)?;
        session.set_remote_state(state);
        Ok(())
    }

    /// Routes a decoded frame to the link it names.
    ///
    /// An Attach for an unknown name creates the local half of a link the peer
    /// initiated, with the opposite role. Any other frame for an unknown link is
    /// logged and dropped.
    pub fn process_frame(&mut self, session: SessionHandle, frame: &Frame) -> Result<()> {
        let session = self.sessions.get_mut(session.index()).ok_or(InvalidArgumentKind::UnknownEndpoint)?;
        trace!(link = %frame.link, kind = frame.body.name(), "inbound frame");

        let handle = match (session.find(&frame.link), &frame.body) {
            (Some(handle), _) => handle,
            (None, Performative::Attach(attach)) => {
                match session.create_link(&frame.link, attach.role.opposite()) {
                    Ok(handle) => {
                        debug!(link = %frame.link, "peer initiated link");
                        handle
                    }
                    Err(error) => {
                        warn!(link = %frame.link, %error, "cannot host peer initiated link");
                        self.frames_ignored += 1;
                        return Ok(());
                    }
                }
            }
            (None, body) => {
                warn!(link = %frame.link, kind = body.name(), "frame for unknown link");
                self.frames_ignored += 1;
                return Ok(());
            }
        };

        if let Some(link) = session.link_mut(handle) {
            link.process_performative(&frame.body);
        }
        Ok(())
    }

    /// Collects every link's outbound performatives, in session then link
    /// order.
    pub fn pump(&mut self) -> Vec<OutboundFrame> {
        let mut frames = Vec::new();
        for session in &mut self.sessions {
            let session_handle = session.handle();
            for link in session.links_mut() {
                if !link.has_pending_performatives() {
                    continue;
                }
                for body in link.take_performatives() {
                    frames.push(OutboundFrame {
                        session: session_handle,
                        frame: Frame::new(link.name(), body),
                    });
                }
            }
        }
        if !frames.is_empty() {
            trace!(count = frames.len(), "pumped frames");
        }
        self.collect_work();
        frames
    }
}

impl Endpoint for Connection {
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
