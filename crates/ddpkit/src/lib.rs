//! Distributed Display Protocol (DDP) for LED pixel displays.
//!
//! ddpkit sends pixel data to DDP displays and receives it on the other
//! side, routing each packet to a handler keyed by destination ID.
//!
//! # Crate Structure
//!
//! - [`transport`]: UDP sockets and address resolution (port 4048 by default)
//! - [`proto`]: header, pixel format and flag codecs, timecodes
//! - [`peer`]: controller and server (behind the `peer` feature, on by default)
//!
//! ```no_run
//! use ddpkit::peer::Controller;
//! use ddpkit::proto::timecode;
//! use std::time::Duration;
//!
//! let mut display = Controller::connect("192.168.1.50:4048")?;
//! display.enable_timecode(timecode::from_delay(Duration::from_millis(40)));
//! display.write_at(&[0, 0, 255], 3)?;
//! # Ok::<(), ddpkit::peer::PeerError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use ddpkit_transport::*;
}

/// Re-export protocol codec types.
pub mod proto {
    pub use ddpkit_proto::*;
}

/// Re-export controller and server types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use ddpkit_peer::*;
}
