//! Track a single order over the push channel.
//!
//! Usage:
//!   cargo run --example track_order -- <channel-addr> <order-id>
//!   cargo run --example track_order -- 127.0.0.1:8081 68af3c

use mangal_client::{ChannelEvent, MessageClient, Room};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:8081".to_string());
    let order_id = args.next().expect("usage: track_order <addr> <order-id>");

    let client = MessageClient::connect(&addr, "track-order-example").await?;
    let room = Room::Order(order_id.clone());
    client.join(&room).await?;
    println!("joined {}, waiting for updates (ctrl-c to quit)", room);

    let mut rx = client.subscribe();
    loop {
        match MessageClient::recv_event(&mut rx).await? {
            ChannelEvent::OrderUpdate(patch) => {
                println!(
                    "update: status={:?} eta={:?} readyAt={:?}",
                    patch.status, patch.eta_minutes, patch.ready_at
                );
            }
            ChannelEvent::DriverLocation(loc) => {
                println!("driver at {:.5},{:.5}", loc.lat, loc.lng);
            }
            other => println!("event: {:?}", other),
        }
    }
}
