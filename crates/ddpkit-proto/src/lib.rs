//! Distributed Display Protocol (DDP) codec.
//!
//! Every DDP datagram starts with a fixed header:
//! - 1 flags byte (version tag + timecode/storage/reply/query/push bits)
//! - 1 sequence number byte (0 disables sequencing)
//! - 1 pixel format byte
//! - 1 destination ID byte
//! - 4-byte big-endian buffer offset
//! - 2-byte big-endian payload length
//! - 4-byte big-endian timecode, only when the timecode flag is set
//!
//! The payload follows directly. This crate encodes and decodes that layout;
//! it does no I/O.

pub mod error;
pub mod flags;
pub mod header;
pub mod id;
pub mod packet;
pub mod pixel;
pub mod timecode;

pub use error::{ProtoError, Result};
pub use flags::ConfigFlags;
pub use header::{Header, HEADER_LEN, HEADER_LEN_TIMECODE};
pub use id::{id_name, BROADCAST, CONFIG, CONTROL, DEFAULT_DISPLAY, DMX_TRANSIT, RESERVED, STATUS};
pub use packet::{decode_packet, LengthMismatch, Packet, MAX_PAYLOAD};
pub use pixel::{DataSize, DataType, PixelFormat};
