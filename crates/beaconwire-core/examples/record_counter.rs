//! Example: Advertising a Press Counter
//!
//! This example creates a counter fed by the on-board switch, then records
//! a macro that copies the count into the iBeacon major number every time
//! the counter changes. It runs against the mock transport and prints every
//! frame that would be written to the peripheral.
//!
//! Run with: `cargo run --example record_counter`

use std::sync::Arc;

use beaconwire_core::{Board, BoardEvent, MockTransportBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let transport = Arc::new(MockTransportBuilder::new().auto_reply(true).build());
    let board = Arc::new(Board::new("demo", transport.clone()));
    let mut events = board.subscribe();

    // Replies carry the processor ids the peripheral assigns
    if let Some(replies) = transport.take_replies() {
        board.listen(replies);
    }

    println!("Creating counter...");
    let counter = board
        .create_counter_resolved(&board.switch_state_signal(), 4)
        .await?;
    println!("Counter: {}", counter);
    println!();

    board.begin_recording(&counter).await?;
    board.ibeacon().set_major_signal(&counter).await?;
    let summary = board.end_recording().await?;
    println!("Recorded {} entries", summary.entries.len());
    println!();

    println!("Frames:");
    while let Ok(event) = events.try_recv() {
        if let BoardEvent::CommandWritten {
            frame, recorded, ..
        } = event
        {
            let route = if recorded { "recorded" } else { "direct" };
            println!("  {:<8} {}", route, frame);
        }
    }

    Ok(())
}
