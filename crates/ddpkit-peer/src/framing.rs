use bytes::{BufMut, BytesMut};
use ddpkit_proto::{id, ConfigFlags, Header, PixelFormat, HEADER_LEN_TIMECODE, MAX_PAYLOAD};

use crate::error::{PeerError, Result};

/// Outgoing header state shared by the blocking and async controllers.
///
/// Owns the one mutable [`Header`] a controller sends with and the buffer
/// each datagram is assembled in.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    header: Header,
    buf: BytesMut,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new(Header::default())
    }
}

impl FrameBuilder {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            buf: BytesMut::with_capacity(HEADER_LEN_TIMECODE + MAX_PAYLOAD),
        }
    }

    /// The header as it will be used for the next datagram (before the
    /// sequence number advances).
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    /// Set the destination ID. ID 0 is reserved and leaves the header unchanged.
    pub fn set_destination(&mut self, destination_id: u8) -> Result<()> {
        if id::is_reserved(destination_id) {
            return Err(PeerError::ReservedIdentifier(destination_id));
        }
        self.header.destination_id = destination_id;
        Ok(())
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.header.offset = offset;
    }

    /// Set the sequence number; 0 disables sequencing.
    pub fn set_sequence_number(&mut self, sequence_number: u8) {
        self.header.sequence_number = sequence_number;
    }

    pub fn set_pixel_format(&mut self, pixel_format: PixelFormat) {
        self.header.pixel_format = pixel_format;
    }

    pub fn set_flags(&mut self, flags: ConfigFlags) {
        self.header.flags = flags;
    }

    /// Send a timecode with every subsequent datagram.
    pub fn enable_timecode(&mut self, timecode: u32) {
        self.header.flags.timecode = true;
        self.header.timecode = timecode;
    }

    pub fn disable_timecode(&mut self) {
        self.header.flags.timecode = false;
        self.header.timecode = 0;
    }

    /// Assemble header and payload into one datagram.
    ///
    /// Rejects payloads over [`MAX_PAYLOAD`] without touching the header.
    /// Otherwise advances the sequence number and sets the length first; the
    /// changes stick even if the caller then fails to send.
    pub fn frame(&mut self, payload: &[u8]) -> Result<&[u8]> {
        if payload.len() > MAX_PAYLOAD {
            return Err(PeerError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        self.header.sequence_number = next_sequence(self.header.sequence_number);
        // MAX_PAYLOAD fits in u16.
        self.header.length = payload.len() as u16;

        self.buf.clear();
        self.header.encode_into(&mut self.buf);
        self.buf.put_slice(payload);
        Ok(&self.buf)
    }
}

/// Sequence number for the next datagram.
///
/// 0 stays 0. Values 1-15 increment; anything above 15 resets to 1. The
/// increment happens before the range check, so 15 is followed by 16 on the
/// wire and only then by 1. Existing receivers see this cycle; changing it
/// is a compatibility break.
pub fn next_sequence(current: u8) -> u8 {
    match current {
        0 => 0,
        16..=u8::MAX => 1,
        n => n + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_cycle_includes_sixteen() {
        let mut seq = 14;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seq = next_sequence(seq);
            seen.push(seq);
        }
        assert_eq!(seen, vec![15, 16, 1, 2]);
    }

    #[test]
    fn sequence_zero_is_sticky() {
        assert_eq!(next_sequence(0), 0);
    }

    #[test]
    fn sequence_out_of_range_resets() {
        assert_eq!(next_sequence(200), 1);
        assert_eq!(next_sequence(255), 1);
    }

    #[test]
    fn frame_sets_length_and_appends_payload() {
        let mut builder = FrameBuilder::default();
        let datagram = builder.frame(&[1, 2, 3]).unwrap().to_vec();
        assert_eq!(datagram.len(), 13);
        assert_eq!(&datagram[8..10], &[0, 3]);
        assert_eq!(&datagram[10..], &[1, 2, 3]);
        assert_eq!(builder.header().length, 3);
        assert_eq!(builder.header().sequence_number, 2);
    }

    #[test]
    fn oversized_payload_leaves_header_alone() {
        let mut builder = FrameBuilder::default();
        let before = *builder.header();
        let err = builder.frame(&vec![0; MAX_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(
            err,
            PeerError::PayloadTooLarge {
                size: 1441,
                max: 1440
            }
        ));
        assert_eq!(*builder.header(), before);
    }

    #[test]
    fn reserved_destination_rejected() {
        let mut builder = FrameBuilder::default();
        builder.set_destination(9).unwrap();
        let err = builder.set_destination(0).unwrap_err();
        assert!(matches!(err, PeerError::ReservedIdentifier(0)));
        assert_eq!(builder.header().destination_id, 9);
    }

    #[test]
    fn timecode_toggle() {
        let mut builder = FrameBuilder::default();
        builder.enable_timecode(0xABCD_1234);
        assert_eq!(builder.frame(b"").unwrap().len(), 14);

        builder.disable_timecode();
        assert!(!builder.header().flags.timecode);
        assert_eq!(builder.header().timecode, 0);
        assert_eq!(builder.frame(b"").unwrap().len(), 10);
    }
}
