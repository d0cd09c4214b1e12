//! Tokio flavour of the display server; stops on Ctrl-C.
//!
//! Run with:
//!   cargo run --example async-display-server --features peer,async

use std::sync::Arc;

use ddpkit::peer::AsyncServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = Arc::new(AsyncServer::new());
    server.register_default_handler(|packet, from| {
        eprintln!(
            "{from}: {} bytes for {} at offset {}",
            packet.payload.len(),
            packet.header.destination_id,
            packet.header.offset
        );
        Ok(())
    });

    let local = server.bind(":4048").await?;
    eprintln!("Listening on {local}");

    let serving = Arc::clone(&server);
    let task = tokio::spawn(async move { serving.serve().await });

    tokio::signal::ctrl_c().await?;
    server.close();
    task.await??;
    Ok(())
}
