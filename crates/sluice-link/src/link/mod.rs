use std::collections::HashMap;

use sluice_core::{
    config::Config,
    error::{ErrorKind, InvalidArgumentKind, Result},
    tag::DeliveryTag,
};
use sluice_protocol::{
    DeliveryState, Detach, EndpointState, ErrorCondition, Fields, ReceiverSettleMode, Role,
    SenderSettleMode, Source, Symbol, Target,
};
use tracing::{debug, trace};

use crate::{
    capabilities::Capabilities,
    credit::CreditController,
    delivery::{Delivery, DeliveryId},
    delivery_list::{CursorMove, DeliveryList, Iter},
    endpoint::Endpoint,
    handle::{LinkHandle, SessionHandle},
    pending_queue::PendingQueue,
    settlement::{ensure_unsealed, SettlementModes},
    statistics::LinkStatistics,
    work::{WorkKind, WorkNotifier},
};

mod incoming;
mod outgoing;

/// One end of a unidirectional AMQP link.
///
/// A link owns its deliveries, tracks credit in both directions and records
/// what the peer announced in its Attach. Frames come in through
/// [`Link::process_performative`] and go out through [`Link::take_performatives`];
/// everything else is the application-facing API.
///
/// Opening a link that was [detached](Link::detach) attaches it again.
#[derive(Debug)]
pub struct Link {
    name: String,
    role: Role,
    config: Config,

    local_state: EndpointState,
    remote_state: EndpointState,
    /// Locally suspended without closing
    detached: bool,
    /// Peer suspended without closing
    remote_detached: bool,
    condition: Option<ErrorCondition>,
    remote_condition: Option<ErrorCondition>,

    source: Option<Source>,
    target: Option<Target>,
    remote_source: Option<Source>,
    remote_target: Option<Target>,
    settlement: SettlementModes,
    capabilities: Capabilities,

    credit: CreditController,
    deliveries: DeliveryList,
    /// Tag index of locally unsettled deliveries
    unsettled: HashMap<DeliveryTag, DeliveryId>,
    /// Sender: advanced deliveries waiting for a Transfer
    outgoing: PendingQueue,
    /// Deliveries whose state or settlement still has to reach the peer
    dispositions: PendingQueue,

    attach_pending: bool,
    detach_pending: Option<Detach>,

    notifier: WorkNotifier,
    statistics: LinkStatistics,
}

impl Link {
    /// Creates an unopened link endpoint.
    pub fn new(name: impl Into<String>, role: Role, config: &Config, notifier: WorkNotifier) -> Link {
        Link {
            name: name.into(),
            role,
            config: config.clone(),
            local_state: EndpointState::Uninitialized,
            remote_state: EndpointState::Uninitialized,
            detached: false,
            remote_detached: false,
            condition: None,
            remote_condition: None,
            source: None,
            target: None,
            remote_source: None,
            remote_target: None,
            settlement: SettlementModes::new(),
            capabilities: Capabilities::new(),
            credit: CreditController::new(role, config.initial_delivery_count),
            deliveries: DeliveryList::new(),
            unsettled: HashMap::new(),
            outgoing: PendingQueue::default(),
            dispositions: PendingQueue::default(),
            attach_pending: false,
            detach_pending: None,
            notifier,
            statistics: LinkStatistics::default(),
        }
    }

    /// Link name, unique within its session.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sender or receiver.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Handle under which the host knows this link.
    pub fn handle(&self) -> LinkHandle {
        self.notifier.link()
    }

    /// Owning session.
    pub fn session(&self) -> SessionHandle {
        self.handle().session()
    }

    /// Delivery counters.
    pub fn statistics(&self) -> &LinkStatistics {
        &self.statistics
    }

    // Lifecycle

    /// Suspends the link without closing it. The peer is sent a Detach with
    /// `closed == false`; opening the link again re-attaches it.
    pub fn detach(&mut self) {
        if !self.local_state.is_active() || self.detached {
            return;
        }
        debug!(link = %self.name, "detaching link");
        self.detached = true;
        self.attach_pending = false;
        self.detach_pending = Some(Detach { closed: false, error: self.condition.clone() });
        self.notifier.notify(WorkKind::State);
    }

    /// True if locally detached and not re-opened since.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// True if the peer detached without closing.
    pub fn is_remote_detached(&self) -> bool {
        self.remote_detached
    }

    /// Error condition sent with our Detach.
    pub fn condition(&self) -> Option<&ErrorCondition> {
        self.condition.as_ref()
    }

    /// Sets the error condition sent with our next Detach.
    pub fn set_condition(&mut self, condition: Option<ErrorCondition>) {
        self.condition = condition;
    }

    /// Error condition carried by the peer's Detach.
    pub fn remote_condition(&self) -> Option<&ErrorCondition> {
        self.remote_condition.as_ref()
    }

    fn ensure_unopened(&self, field: &'static str) -> Result<()> {
        ensure_unsealed(!self.local_state.is_uninitialized(), field)
    }

    // Termini

    /// Local source terminus.
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// Sets the local source. Fails once the link is open.
    pub fn set_source(&mut self, source: Option<Source>) -> Result<()> {
        self.ensure_unopened("source")?;
        self.source = source;
        Ok(())
    }

    /// Local target terminus.
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Sets the local target. Fails once the link is open.
    pub fn set_target(&mut self, target: Option<Target>) -> Result<()> {
        self.ensure_unopened("target")?;
        self.target = target;
        Ok(())
    }

    /// Source announced by the peer.
    pub fn remote_source(&self) -> Option<&Source> {
        self.remote_source.as_ref()
    }

    /// Target announced by the peer.
    pub fn remote_target(&self) -> Option<&Target> {
        self.remote_target.as_ref()
    }

    // Settle modes

    /// Local sender settle mode.
    pub fn sender_settle_mode(&self) -> SenderSettleMode {
        self.settlement.sender_settle_mode()
    }

    /// Sets the local sender settle mode. Fails once the link is open.
    pub fn set_sender_settle_mode(&mut self, mode: SenderSettleMode) -> Result<()> {
        self.settlement.set_sender_settle_mode(mode)
    }

    /// Local receiver settle mode.
    pub fn receiver_settle_mode(&self) -> ReceiverSettleMode {
        self.settlement.receiver_settle_mode()
    }

    /// Sets the local receiver settle mode. Fails once the link is open.
    pub fn set_receiver_settle_mode(&mut self, mode: ReceiverSettleMode) -> Result<()> {
        self.settlement.set_receiver_settle_mode(mode)
    }

    /// Sender settle mode announced by the peer.
    pub fn remote_sender_settle_mode(&self) -> Option<SenderSettleMode> {
        self.settlement.remote_sender_settle_mode()
    }

    /// Receiver settle mode announced by the peer.
    pub fn remote_receiver_settle_mode(&self) -> Option<ReceiverSettleMode> {
        self.settlement.remote_receiver_settle_mode()
    }

    // Capabilities and properties

    /// Capabilities we offer.
    pub fn offered_capabilities(&self) -> Option<&[Symbol]> {
        self.capabilities.offered()
    }

    /// Sets the offered capabilities. Fails once the link is open.
    pub fn set_offered_capabilities(&mut self, capabilities: Option<Vec<Symbol>>) -> Result<()> {
        self.capabilities.set_offered(capabilities)
    }

    /// Capabilities we ask the peer for.
    pub fn desired_capabilities(&self) -> Option<&[Symbol]> {
        self.capabilities.desired()
    }

    /// Sets the desired capabilities. Fails once the link is open.
    pub fn set_desired_capabilities(&mut self, capabilities: Option<Vec<Symbol>>) -> Result<()> {
        self.capabilities.set_desired(capabilities)
    }

    /// Our link properties.
    pub fn properties(&self) -> Option<&Fields> {
        self.capabilities.properties()
    }

    /// Sets the link properties. Fails once the link is open.
    pub fn set_properties(&mut self, properties: Option<Fields>) -> Result<()> {
        self.capabilities.set_properties(properties)
    }

    /// Capabilities the peer offers.
    pub fn remote_offered_capabilities(&self) -> Option<&[Symbol]> {
        self.capabilities.remote_offered()
    }

    /// Capabilities the peer asks for.
    pub fn remote_desired_capabilities(&self) -> Option<&[Symbol]> {
        self.capabilities.remote_desired()
    }

    /// The peer's link properties.
    pub fn remote_properties(&self) -> Option<&Fields> {
        self.capabilities.remote_properties()
    }

    // Deliveries

    /// Creates a delivery with `tag` at the tail of the delivery list.
    ///
    /// Only sending links create deliveries locally; a receiver's deliveries
    /// arrive from the peer.
    pub fn delivery(&mut self, tag: impl Into<DeliveryTag>) -> Result<DeliveryId> {
        let tag = tag.into();
        if self.role.is_receiver() {
            return Err(ErrorKind::Unsupported("creating deliveries on a receiving link"));
        }
        if tag.len() > self.config.max_delivery_tag_length {
            return Err(InvalidArgumentKind::TagTooLong {
                len: tag.len(),
                max: self.config.max_delivery_tag_length,
            }
            .into());
        }
        if self.unsettled.contains_key(&tag) {
            return Err(InvalidArgumentKind::DuplicateTag.into());
        }
        let max = self.config.max_unsettled_deliveries;
        if max > 0 && self.unsettled.len() >= max {
            return Err(InvalidArgumentKind::TooManyUnsettled(max).into());
        }

        let mut delivery = Delivery::new(tag.clone(), self.handle());
        delivery.queued = true;
        let id = self.deliveries.append(delivery);
        self.unsettled.insert(tag, id);
        self.credit.on_delivery_queued();
        self.statistics.deliveries_created += 1;
        trace!(link = %self.name, ?id, "delivery created");
        self.notifier.notify(WorkKind::Delivery(id));
        Ok(id)
    }

    /// Creates a delivery from a window of `bytes`.
    ///
    /// Only the whole buffer is accepted as a tag; any other offset or length
    /// is reserved.
    pub fn delivery_slice(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<DeliveryId> {
        if offset != 0 || length != bytes.len() {
            return Err(ErrorKind::Unsupported("delivery tag offset/length"));
        }
        self.delivery(bytes)
    }

    /// Oldest delivery still held.
    pub fn head(&self) -> Option<&Delivery> {
        self.deliveries.head()
    }

    /// Delivery under the cursor.
    pub fn current(&self) -> Option<&Delivery> {
        self.deliveries.current()
    }

    /// Resolves a delivery of this link.
    pub fn get(&self, id: DeliveryId) -> Option<&Delivery> {
        self.deliveries.get(id)
    }

    /// The delivery after `id` in list order.
    pub fn next_delivery(&self, id: DeliveryId) -> Option<&Delivery> {
        self.deliveries.next_of(id)
    }

    /// All held deliveries, oldest first.
    pub fn deliveries(&self) -> Iter<'_> {
        self.deliveries.iter()
    }

    /// Number of locally unsettled deliveries.
    pub fn unsettled(&self) -> usize {
        self.unsettled.len()
    }

    /// Moves the cursor off the current delivery.
    ///
    /// On a sender this commits the delivery for transmission and uses one
    /// unit of credit. On a receiver it consumes the delivery; the cursor only
    /// moves when another delivery has arrived. Returns true if the cursor
    /// moved.
    pub fn advance(&mut self) -> bool {
        match self.deliveries.advance_cursor(self.role) {
            CursorMove::Moved { from } => {
                self.moved_off(from);
                true
            }
            CursorMove::AtTail | CursorMove::NoCurrent => false,
        }
    }

    /// Applies the accounting for a delivery the cursor just left.
    fn moved_off(&mut self, id: DeliveryId) {
        match self.role {
            Role::Sender => {
                self.credit.on_advance();
                self.outgoing.enqueue(id);
            }
            Role::Receiver => self.consume(id),
        }
        trace!(link = %self.name, ?id, "cursor moved off delivery");
        self.notifier.notify(WorkKind::Delivery(id));
        self.free_if_done(id);
    }

    /// Sets the local state of a delivery; it is sent to the peer unless the
    /// delivery is already settled.
    pub fn disposition(&mut self, id: DeliveryId, state: DeliveryState) -> Result<()> {
        let role = self.role;
        let delivery = self.deliveries.get_mut(id).ok_or(InvalidArgumentKind::UnknownDelivery)?;
        if delivery.is_settled() {
            trace!(?id, "ignoring disposition of settled delivery");
            return Ok(());
        }
        delivery.set_local_state(Some(state));
        // An unsent delivery carries its state in the Transfer instead.
        if role.is_receiver() || delivery.sent {
            self.dispositions.enqueue(id);
        }
        self.notifier.notify(WorkKind::Delivery(id));
        Ok(())
    }

    /// Settles a delivery locally. Settlement never reverts; settling twice
    /// is a no-op.
    ///
    /// Settling the current delivery also moves the cursor past it. The tag
    /// becomes reusable immediately, and the delivery is freed once the peer
    /// has been told (or has itself settled).
    pub fn settle(&mut self, id: DeliveryId) -> Result<()> {
        let delivery = self.deliveries.get(id).ok_or(InvalidArgumentKind::UnknownDelivery)?;
        if delivery.is_settled() {
            return Ok(());
        }
        let tag = delivery.tag().clone();

        if self.deliveries.current_id() == Some(id) {
            // Settling leaves the delivery whichever role we play.
            if let CursorMove::Moved { from } = self.deliveries.advance_cursor(Role::Sender) {
                self.moved_off(from);
            }
        }

        if self.unsettled.get(&tag) == Some(&id) {
            self.unsettled.remove(&tag);
        }

        let role = self.role;
        let Some(delivery) = self.deliveries.get_mut(id) else {
            return Ok(());
        };
        delivery.mark_settled();
        if !delivery.remote_settled() && (role.is_receiver() || delivery.sent) {
            self.dispositions.enqueue(id);
        }
        self.statistics.deliveries_settled += 1;
        debug!(link = %self.name, ?id, "delivery settled");
        self.notifier.notify(WorkKind::Delivery(id));
        self.free_if_done(id);
        Ok(())
    }

    fn consume(&mut self, id: DeliveryId) {
        if let Some(delivery) = self.deliveries.get_mut(id) {
            if delivery.queued {
                delivery.queued = false;
                self.credit.on_consumed();
            }
        }
    }

    /// Clears the updated flag of a delivery.
    pub fn clear_updated(&mut self, id: DeliveryId) -> Result<()> {
        let delivery = self.deliveries.get_mut(id).ok_or(InvalidArgumentKind::UnknownDelivery)?;
        delivery.clear_updated();
        Ok(())
    }

    /// Sender: records how many payload bytes the transport has to write.
    pub fn set_pending(&mut self, id: DeliveryId, bytes: usize) -> Result<()> {
        let delivery = self.deliveries.get_mut(id).ok_or(InvalidArgumentKind::UnknownDelivery)?;
        delivery.writable = bytes;
        Ok(())
    }

    /// Receiver: marks up to `max` received bytes as read and returns how
    /// many were.
    pub fn read(&mut self, id: DeliveryId, max: usize) -> Result<usize> {
        let delivery = self.deliveries.get_mut(id).ok_or(InvalidArgumentKind::UnknownDelivery)?;
        let read = delivery.readable.min(max);
        delivery.readable -= read;
        Ok(read)
    }

    /// Unlinks a delivery once every obligation on it is met.
    pub(crate) fn free_if_done(&mut self, id: DeliveryId) {
        let freeable = self.deliveries.get(id).is_some_and(Delivery::is_freeable);
        if !freeable {
            return;
        }
        if let Some(delivery) = self.deliveries.remove(id) {
            self.outgoing.remove(id);
            self.dispositions.remove(id);
            self.statistics.deliveries_freed += 1;
            self.notifier.withdraw(WorkKind::Delivery(id));
            trace!(link = %self.name, tag = ?delivery.tag(), "delivery freed");
        }
    }

    // Credit

    /// Local credit.
    pub fn credit(&self) -> i32 {
        self.credit.credit()
    }

    /// Deliveries not yet sent (sender) or consumed (receiver).
    pub fn queued(&self) -> u32 {
        self.credit.queued()
    }

    /// Credit as the peer sees it.
    pub fn remote_credit(&self) -> i32 {
        self.credit.remote_credit()
    }

    /// Sender: the peer asked us to drain. Receiver: we asked the peer to.
    pub fn drain_requested(&self) -> bool {
        self.credit.drain()
    }

    /// Delivery count as it goes on the wire.
    pub fn delivery_count(&self) -> u32 {
        self.credit.delivery_count()
    }

    /// Returns credit given back through drain since the last call.
    pub fn drained(&mut self) -> u32 {
        let drained = self.credit.drained();
        if drained > 0 && self.role.is_sender() {
            self.notifier.notify(WorkKind::Flow);
        }
        drained
    }

    /// Receiver: grants `credits` more deliveries.
    pub fn flow(&mut self, credits: u32) -> Result<()> {
        self.ensure_receiver("flow")?;
        self.credit.grant(credits);
        trace!(link = %self.name, credits, "credit granted");
        self.notifier.notify(WorkKind::Flow);
        Ok(())
    }

    /// Receiver: grants `credits` and asks the sender to use or return all
    /// outstanding credit.
    pub fn drain(&mut self, credits: u32) -> Result<()> {
        self.ensure_receiver("drain")?;
        self.credit.set_drain(true);
        self.flow(credits)
    }

    /// Receiver: sets or clears the drain flag.
    pub fn set_drain(&mut self, drain: bool) -> Result<()> {
        self.ensure_receiver("set_drain")?;
        self.credit.set_drain(drain);
        self.notifier.notify(WorkKind::Flow);
        Ok(())
    }

    /// Receiver: drain requested and credit still outstanding.
    pub fn draining(&self) -> bool {
        self.role.is_receiver() && self.credit.draining()
    }

    fn ensure_receiver(&self, operation: &'static str) -> Result<()> {
        if self.role.is_sender() {
            debug!(link = %self.name, operation, "credit operation on a sending link");
            return Err(ErrorKind::Unsupported("granting credit from a sending link"));
        }
        Ok(())
    }
}

impl Endpoint for Link {
    fn local_state(&self) -> EndpointState {
        self.local_state
    }

    fn remote_state(&self) -> EndpointState {
        self.remote_state
    }

    fn open(&mut self) {
        match self.local_state {
            EndpointState::Uninitialized => {
                debug!(link = %self.name, role = ?self.role, "opening link");
                self.local_state = EndpointState::Active;
                self.settlement.seal();
                self.capabilities.seal();
                self.attach_pending = true;
                self.notifier.notify(WorkKind::State);
            }
            EndpointState::Active if self.detached => {
                debug!(link = %self.name, "re-attaching link");
                self.detached = false;
                self.attach_pending = true;
                self.notifier.notify(WorkKind::State);
            }
            _ => {}
        }
    }

    fn close(&mut self) {
        if self.local_state.is_closed() {
            return;
        }
        let was_open = self.local_state.is_active();
        self.local_state = EndpointState::Closed;
        self.settlement.seal();
        self.capabilities.seal();
        if was_open && !self.detached {
            debug!(link = %self.name, "closing link");
            self.detach_pending = Some(Detach { closed: true, error: self.condition.clone() });
        }
        self.notifier.notify(WorkKind::State);
    }
}
