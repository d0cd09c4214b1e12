use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::header::Header;

/// Maximum payload per datagram: 480 RGB pixels.
pub const MAX_PAYLOAD: usize = 480 * 3;

/// A received DDP packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub payload: Bytes,
}

/// The datagram held fewer payload bytes than its header declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMismatch {
    /// Length from the header.
    pub declared: usize,
    /// Bytes actually present after the header.
    pub actual: usize,
}

impl Packet {
    pub fn new(header: Header, payload: impl Into<Bytes>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// Wire form: the header exactly as stored, followed by the payload.
    ///
    /// `header.length` is not recomputed.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.header.encoded_len() + self.payload.len());
        self.header.encode_into(&mut buf);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

/// Split one datagram into header and payload.
///
/// Only `header.length` bytes are taken as payload; anything after that is
/// padding and dropped. A datagram shorter than declared is not an error:
/// the whole remainder becomes the payload and the shortfall is reported
/// as a [`LengthMismatch`].
pub fn decode_packet(datagram: Bytes) -> Result<(Packet, Option<LengthMismatch>)> {
    let (header, header_len) = Header::parse(&datagram)?;

    let declared = usize::from(header.length);
    let actual = datagram.len() - header_len;

    let (payload, mismatch) = if actual < declared {
        (
            datagram.slice(header_len..),
            Some(LengthMismatch { declared, actual }),
        )
    } else {
        (datagram.slice(header_len..header_len + declared), None)
    };

    Ok((Packet { header, payload }, mismatch))
}
