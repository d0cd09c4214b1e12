//! Receives pixel data for display 1 and logs everything else.
//!
//! Run with:
//!   cargo run --example display-server --features peer
//!
//! In another terminal:
//!   cargo run --features cli -- send 127.0.0.1 --fill 255,0,0 --pixels 8

use std::net::SocketAddr;

use ddpkit::peer::Server;
use ddpkit::proto::{id_name, Packet};

fn describe(packet: &Packet, from: SocketAddr) {
    let header = &packet.header;
    eprintln!(
        "{from}: {} bytes for {} ({}) at offset {}, seq {}",
        packet.payload.len(),
        header.destination_id,
        id_name(header.destination_id),
        header.offset,
        header.sequence_number
    );
    if header.flags.timecode {
        eprintln!("  timecode 0x{:08X}", header.timecode);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::new();

    server.register_handler(1, |packet, from| {
        describe(packet, from);
        if let [r, g, b, ..] = packet.payload.as_ref() {
            eprintln!("  first pixel r={r} g={g} b={b}");
        }
        Ok(())
    });
    server.register_default_handler(|packet, from| {
        eprintln!("unhandled destination {}", packet.header.destination_id);
        describe(packet, from);
        Ok(())
    });

    let local = server.bind("")?;
    eprintln!("Listening on {local}");

    // Press Enter (or close stdin) to stop.
    let shutdown = server.shutdown_handle();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        shutdown.close();
    });

    server.serve()?;
    eprintln!("stopped");
    Ok(())
}
