//! Integration tests for the sluice-host crate.
//!
//! Two connections are wired back to back: whatever one pumps, the other
//! processes, until both are quiet.

use proptest::prelude::*;
use sluice_core::config::Config;
use sluice_host::Connection;
use sluice_link::{Endpoint, LinkHandle, SessionHandle, WorkKind};
use sluice_protocol::{DeliveryState, EndpointState, EndpointStates, Role};

fn exchange(a: &mut Connection, b: &mut Connection) {
    loop {
        let to_b = a.pump();
        let to_a = b.pump();
        if to_a.is_empty() && to_b.is_empty() {
            return;
        }
        for outbound in to_b {
            b.process_frame(outbound.session, &outbound.frame).unwrap();
        }
        for outbound in to_a {
            a.process_frame(outbound.session, &outbound.frame).unwrap();
        }
    }
}

/// A client with an open sender and a server that has only created its session.
fn client_and_server() -> (Connection, Connection, LinkHandle) {
    let config = Config::default();
    let mut client = Connection::new(&config);
    let mut server = Connection::new(&config);
    let session = client.session();
    server.session();

    let sender = client.session_mut(session).unwrap().sender("uplink").unwrap();
    client.link_mut(sender).unwrap().open();
    (client, server, sender)
}

#[test]
fn test_peer_initiated_link_is_discoverable() {
    let (mut client, mut server, _) = client_and_server();
    exchange(&mut client, &mut server);

    let pending = server
        .link_head(EndpointStates::UNINITIALIZED, EndpointStates::ACTIVE)
        .expect("peer attach should create a local link");
    let link = server.link(pending).unwrap();
    assert_eq!(link.name(), "uplink");
    assert_eq!(link.role(), Role::Receiver);
    assert!(server.has_work());

    server.link_mut(pending).unwrap().open();
    exchange(&mut client, &mut server);
    assert_eq!(server.link_head(EndpointStates::UNINITIALIZED, EndpointStates::ANY), None);

    let sender = client.link_head(EndpointStates::ACTIVE, EndpointStates::ACTIVE).unwrap();
    assert_eq!(client.link(sender).map(|l| l.remote_state()), Some(EndpointState::Active));
}

#[test]
fn test_messages_flow_end_to_end() {
    let (mut client, mut server, sender) = client_and_server();
    exchange(&mut client, &mut server);
    let receiver = server.link_head(EndpointStates::UNINITIALIZED, EndpointStates::ACTIVE).unwrap();
    {
        let link = server.link_mut(receiver).unwrap();
        link.open();
        link.flow(10).unwrap();
    }
    exchange(&mut client, &mut server);
    assert_eq!(client.link(sender).unwrap().credit(), 10);

    for i in 0..4 {
        let link = client.link_mut(sender).unwrap();
        let id = link.delivery(format!("m{}", i).as_str()).unwrap();
        link.set_pending(id, 100).unwrap();
        link.advance();
    }
    exchange(&mut client, &mut server);

    let link = server.link_mut(receiver).unwrap();
    assert_eq!(link.queued(), 4);
    while let Some(id) = link.current().map(|d| d.id()) {
        assert_eq!(link.get(id).map(|d| d.available()), Some(100));
        link.disposition(id, DeliveryState::Accepted).unwrap();
        link.settle(id).unwrap();
    }
    assert_eq!(link.queued(), 0);
    assert_eq!(link.credit(), 6);
    exchange(&mut client, &mut server);

    let link = client.link(sender).unwrap();
    assert_eq!(link.unsettled(), 4);
    assert!(link.deliveries().all(|d| d.remote_settled()));
    assert!(link.deliveries().all(|d| d.remote_state() == Some(&DeliveryState::Accepted)));
}

#[test]
fn test_work_reports_deliveries_to_receiver() {
    let (mut client, mut server, sender) = client_and_server();
    exchange(&mut client, &mut server);
    let receiver = server.link_head(EndpointStates::UNINITIALIZED, EndpointStates::ACTIVE).unwrap();
    server.link_mut(receiver).unwrap().open();
    server.link_mut(receiver).unwrap().flow(1).unwrap();
    exchange(&mut client, &mut server);
    server.drain_work();

    let link = client.link_mut(sender).unwrap();
    link.delivery("only").unwrap();
    link.advance();
    exchange(&mut client, &mut server);

    let arrived = server.link(receiver).and_then(|l| l.current()).map(|d| d.id()).unwrap();
    let work = server.drain_work();
    assert!(work.iter().any(|w| w.link == receiver && w.kind == WorkKind::Delivery(arrived)));
}

#[test]
fn test_close_reaches_peer() {
    let (mut client, mut server, sender) = client_and_server();
    exchange(&mut client, &mut server);
    let receiver = server.link_head(EndpointStates::UNINITIALIZED, EndpointStates::ACTIVE).unwrap();
    server.link_mut(receiver).unwrap().open();
    exchange(&mut client, &mut server);

    client.link_mut(sender).unwrap().close();
    exchange(&mut client, &mut server);
    assert_eq!(
        server.link_head(EndpointStates::ACTIVE, EndpointStates::CLOSED),
        Some(receiver)
    );

    server.link_mut(receiver).unwrap().close();
    exchange(&mut client, &mut server);
    assert_eq!(client.link_head(EndpointStates::ANY, EndpointStates::ACTIVE), None);
    assert_eq!(
        client.link_head(EndpointStates::CLOSED, EndpointStates::CLOSED),
        Some(sender)
    );
}

fn state_set() -> impl Strategy<Value = EndpointStates> {
    (0u8..8).prop_map(|bits| {
        let mut states = EndpointStates::empty();
        if bits & 1 != 0 {
            states = states | EndpointStates::UNINITIALIZED;
        }
        if bits & 2 != 0 {
            states = states | EndpointStates::ACTIVE;
        }
        if bits & 4 != 0 {
            states = states | EndpointStates::CLOSED;
        }
        states
    })
}

proptest! {
    #[test]
    fn test_next_link_visits_exactly_the_matching_links(
        actions in prop::collection::vec(0u8..3, 1..12),
        local in state_set(),
        remote in state_set(),
    ) {
        let mut connection = Connection::new(&Config::default());
        let session: SessionHandle = connection.session();
        let mut expected = Vec::new();

        for (i, action) in actions.iter().enumerate() {
            let handle = connection.session_mut(session).unwrap().sender(&format!("l{}", i)).unwrap();
            let link = connection.link_mut(handle).unwrap();
            match action {
                0 => {}
                1 => link.open(),
                _ => {
                    link.open();
                    link.close();
                }
            }
            if local.matches(link.local_state()) && remote.matches(link.remote_state()) {
                expected.push(handle);
            }
        }

        let mut visited = Vec::new();
        let mut cursor = connection.link_head(local, remote);
        while let Some(handle) = cursor {
            visited.push(handle);
            cursor = connection.next_link(handle, local, remote);
        }
        prop_assert_eq!(visited, expected);
    }
}
