//! Two connections wired back to back in one process.
//!
//! The client opens a sender, the server accepts the peer-initiated link and
//! grants credit, and every delivery is accepted and settled on both ends.
//!
//! - cargo run -p sluice --example loopback
//! - cargo run -p sluice --example loopback -- 10
//!   (sends 10 messages)

use std::env;

use sluice::prelude::*;

/// Moves frames between the two connections until neither has anything to say.
fn exchange(a: &mut Connection, b: &mut Connection) -> sluice::Result<usize> {
    let mut moved = 0;
    loop {
        let to_b = a.pump();
        let to_a = b.pump();
        if to_a.is_empty() && to_b.is_empty() {
            return Ok(moved);
        }
        moved += to_a.len() + to_b.len();
        for outbound in to_b {
            b.process_frame(outbound.session, &outbound.frame)?;
        }
        for outbound in to_a {
            a.process_frame(outbound.session, &outbound.frame)?;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let count: u32 = env::args().nth(1).and_then(|arg| arg.parse().ok()).unwrap_or(5);

    let config = Config::default();
    let mut client = Connection::new(&config);
    let mut server = Connection::new(&config);
    let client_session = client.session();
    server.session();

    let sender = client
        .session_mut(client_session)
        .ok_or("client session vanished")?
        .sender("loopback")?;
    client.link_mut(sender).ok_or("sender vanished")?.open();
    exchange(&mut client, &mut server)?;

    let receiver = server
        .link_head(EndpointStates::UNINITIALIZED, EndpointStates::ACTIVE)
        .ok_or("server saw no attach")?;
    {
        let link = server.link_mut(receiver).ok_or("receiver vanished")?;
        link.open();
        link.flow(count)?;
    }
    exchange(&mut client, &mut server)?;
    println!("sender credit after attach: {}", client.link(sender).map_or(0, Link::credit));

    for i in 0..count {
        let link = client.link_mut(sender).ok_or("sender vanished")?;
        let id = link.delivery(format!("msg-{}", i).as_str())?;
        link.set_pending(id, 64)?;
        link.advance();
    }
    let frames = exchange(&mut client, &mut server)?;
    println!("{} frames carried {} transfers", frames, count);

    let link = server.link_mut(receiver).ok_or("receiver vanished")?;
    while let Some(id) = link.current().map(Delivery::id) {
        link.disposition(id, DeliveryState::Accepted)?;
        link.settle(id)?;
    }
    exchange(&mut client, &mut server)?;

    let link = client.link_mut(sender).ok_or("sender vanished")?;
    let settled: Vec<DeliveryId> =
        link.deliveries().filter(|d| d.remote_settled()).map(Delivery::id).collect();
    for id in &settled {
        link.settle(*id)?;
    }
    println!(
        "peer settled {} deliveries; {} still held by the sender",
        settled.len(),
        link.deliveries().count()
    );
    Ok(())
}
