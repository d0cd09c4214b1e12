//! Sweeps a single lit pixel along a strip, scheduling each frame slightly
//! ahead with a timecode.
//!
//! Run with:
//!   cargo run --example timecoded-client --features peer -- 127.0.0.1 60

use std::thread;
use std::time::Duration;

use ddpkit::peer::Controller;
use ddpkit::proto::{timecode, MAX_PAYLOAD};
use ddpkit::transport::UdpSender;

const FRAME: Duration = Duration::from_millis(40);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let pixels: usize = args.next().map(|n| n.parse()).transpose()?.unwrap_or(60);

    let mut display = Controller::connect(&addr)?;
    eprintln!("Sending {pixels} pixels to {addr}");

    let mut frame = vec![0u8; pixels * 3];
    for lit in 0..pixels {
        frame.fill(0);
        frame[lit * 3..lit * 3 + 3].copy_from_slice(&[255, 64, 0]);

        display.enable_timecode(timecode::from_delay(FRAME));
        send_frame(&mut display, &frame)?;
        thread::sleep(FRAME);
    }

    display.disable_timecode();
    frame.fill(0);
    send_frame(&mut display, &frame)?;
    Ok(())
}

fn send_frame(
    display: &mut Controller<UdpSender>,
    frame: &[u8],
) -> Result<(), ddpkit::peer::PeerError> {
    // One datagram carries at most 480 RGB pixels.
    for (index, chunk) in frame.chunks(MAX_PAYLOAD).enumerate() {
        display.write_at(chunk, (index * MAX_PAYLOAD) as u32)?;
    }
    Ok(())
}
