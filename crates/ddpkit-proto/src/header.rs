use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ProtoError, Result};
use crate::flags::ConfigFlags;
use crate::pixel::PixelFormat;

/// Header size without timecode.
pub const HEADER_LEN: usize = 10;

/// Header size with the timecode field present.
pub const HEADER_LEN_TIMECODE: usize = 14;

/// A DDP packet header.
///
/// Wire format (all multi-byte fields big-endian):
/// ```text
/// ┌───────┬─────┬────────┬────┬────────────┬────────────┬──────────────────┐
/// │ flags │ seq │ format │ id │ offset(4B) │ length(2B) │ timecode(4B)     │
/// │  1B   │ 1B  │   1B   │ 1B │            │            │ iff flags.timecode│
/// └───────┴─────┴────────┴────┴────────────┴────────────┴──────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub flags: ConfigFlags,
    /// Rolling sequence number; 0 means sequencing is disabled.
    pub sequence_number: u8,
    pub pixel_format: PixelFormat,
    pub destination_id: u8,
    /// Byte offset into the receiver's frame buffer.
    pub offset: u32,
    /// Payload length in bytes.
    pub length: u16,
    /// Only serialized when `flags.timecode` is set.
    pub timecode: u32,
}

impl Default for Header {
    /// Push flag, sequence 1, RGB/24-bit, display ID 1, offset 0.
    fn default() -> Self {
        Self {
            flags: ConfigFlags::push(),
            sequence_number: 1,
            pixel_format: PixelFormat::rgb24(),
            destination_id: crate::id::DEFAULT_DISPLAY,
            offset: 0,
            length: 0,
            timecode: 0,
        }
    }
}

impl Header {
    /// Serialized size of this header: 10, or 14 with timecode.
    pub fn encoded_len(&self) -> usize {
        if self.flags.timecode {
            HEADER_LEN_TIMECODE
        } else {
            HEADER_LEN
        }
    }

    /// Append the wire form of this header to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_u8(self.flags.to_byte());
        dst.put_u8(self.sequence_number);
        dst.put_u8(self.pixel_format.to_byte());
        dst.put_u8(self.destination_id);
        dst.put_u32(self.offset);
        dst.put_u16(self.length);
        if self.flags.timecode {
            dst.put_u32(self.timecode);
        }
    }

    /// Serialize to a standalone buffer of exactly [`Header::encoded_len`] bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Parse a header from the start of `src`.
    ///
    /// Returns the header and the number of bytes it occupied (10 or 14),
    /// which is where the payload starts. Trailing bytes are not inspected.
    pub fn parse(src: &[u8]) -> Result<(Self, usize)> {
        if src.len() < HEADER_LEN {
            return Err(ProtoError::MalformedHeader {
                needed: HEADER_LEN,
                available: src.len(),
            });
        }

        let flags = ConfigFlags::from_byte(src[0]);
        let consumed = if flags.timecode {
            HEADER_LEN_TIMECODE
        } else {
            HEADER_LEN
        };
        if src.len() < consumed {
            return Err(ProtoError::MalformedHeader {
                needed: consumed,
                available: src.len(),
            });
        }

        let timecode = if flags.timecode {
            u32::from_be_bytes([src[10], src[11], src[12], src[13]])
        } else {
            0
        };

        let header = Self {
            flags,
            sequence_number: src[1],
            pixel_format: PixelFormat::from_byte(src[2]),
            destination_id: src[3],
            offset: u32::from_be_bytes([src[4], src[5], src[6], src[7]]),
            length: u16::from_be_bytes([src[8], src[9]]),
            timecode,
        };

        Ok((header, consumed))
    }
}
