//! Work notifications from links to their connection.
//!
//! A link never holds a reference to its connection. Instead it carries a
//! [`WorkNotifier`] that pushes [`WorkReport`]s into a crossbeam channel the
//! connection drains into its work set. Events are raised when something
//! needs attention and withdrawn when a freed delivery makes them moot.

use crossbeam_channel::Sender;
use tracing::trace;

use crate::{delivery::DeliveryId, handle::LinkHandle};

/// What kind of attention a link needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkKind {
    /// A delivery changed and may need application or transport attention
    Delivery(DeliveryId),
    /// Flow state changed (credit granted, drain requested or completed)
    Flow,
    /// Endpoint state changed or a lifecycle frame is pending
    State,
}

/// A unit of work announced by a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkEvent {
    /// The link that needs attention
    pub link: LinkHandle,
    /// Why it needs attention
    pub kind: WorkKind,
}

/// What a link tells its connection about a [`WorkEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkReport {
    /// The event needs attention
    Raised(WorkEvent),
    /// The event no longer applies
    Withdrawn(WorkEvent),
}

impl WorkReport {
    /// The event being raised or withdrawn.
    pub fn event(&self) -> WorkEvent {
        match self {
            WorkReport::Raised(event) | WorkReport::Withdrawn(event) => *event,
        }
    }
}

/// Destination for work reports.
trait WorkSink {
    fn send(&self, report: WorkReport);
}

/// Channel-backed sink using crossbeam `Sender`.
#[derive(Debug, Clone)]
struct ChannelSink(Sender<WorkReport>);

impl WorkSink for ChannelSink {
    fn send(&self, report: WorkReport) {
        // A dropped receiver means the connection is gone; nobody is left to notify.
        if self.0.send(report).is_err() {
            trace!(link = %report.event().link, "work receiver dropped");
        }
    }
}

/// Handle a link uses to report pending work to its connection.
#[derive(Debug, Clone)]
pub struct WorkNotifier {
    link: LinkHandle,
    sink: Option<ChannelSink>,
}

impl WorkNotifier {
    /// Creates a notifier for `link` reporting into `sender`.
    pub fn new(link: LinkHandle, sender: Sender<WorkReport>) -> Self {
        Self { link, sink: Some(ChannelSink(sender)) }
    }

    /// Creates a notifier that reports nowhere, for links not hosted by a
    /// connection.
    pub fn detached(link: LinkHandle) -> Self {
        Self { link, sink: None }
    }

    /// The link this notifier speaks for.
    pub fn link(&self) -> LinkHandle {
        self.link
    }

    pub(crate) fn notify(&self, kind: WorkKind) {
        if let Some(sink) = &self.sink {
            sink.send(WorkReport::Raised(WorkEvent { link: self.link, kind }));
        }
    }

    pub(crate) fn withdraw(&self, kind: WorkKind) {
        if let Some(sink) = &self.sink {
            sink.send(WorkReport::Withdrawn(WorkEvent { link: self.link, kind }));
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::unbounded;

    use super::*;
    use crate::handle::SessionHandle;

    #[test]
    fn test_notify_reaches_channel() {
        let (tx, rx) = unbounded();
        let link = LinkHandle::new(SessionHandle::new(1), 2);
        let notifier = WorkNotifier::new(link, tx);

        notifier.notify(WorkKind::Flow);
        notifier.withdraw(WorkKind::State);
        assert_eq!(rx.try_recv(), Ok(WorkReport::Raised(WorkEvent { link, kind: WorkKind::Flow })));
        assert_eq!(
            rx.try_recv(),
            Ok(WorkReport::Withdrawn(WorkEvent { link, kind: WorkKind::State }))
        );
    }

    #[test]
    fn test_notify_survives_dropped_receiver() {
        let (tx, rx) = unbounded();
        drop(rx);
        let notifier = WorkNotifier::new(LinkHandle::default(), tx);
        notifier.notify(WorkKind::State);

        WorkNotifier::detached(LinkHandle::default()).notify(WorkKind::State);
    }
}
