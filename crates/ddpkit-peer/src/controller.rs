use ddpkit_proto::{ConfigFlags, Header, PixelFormat};
use ddpkit_transport::{DatagramSink, TransportError, UdpSender};
use tracing::trace;

use crate::error::Result;
use crate::framing::FrameBuilder;

/// Sends pixel data to one display.
///
/// A controller owns a single header. Each [`Controller::write`] advances
/// its sequence number, stamps the payload length, and sends header and
/// payload as one datagram. Methods take `&mut self`; share a controller
/// across threads only behind a lock.
pub struct Controller<T> {
    framer: FrameBuilder,
    transport: T,
}

impl Controller<UdpSender> {
    /// Connect to a display over UDP (port 4048 unless `addr` names one).
    pub fn connect(addr: &str) -> Result<Self> {
        let transport = UdpSender::connect(addr)?;
        Ok(Self::new(transport))
    }
}

impl<T: DatagramSink> Controller<T> {
    /// Create a controller with the default header.
    pub fn new(transport: T) -> Self {
        Self::with_header(transport, Header::default())
    }

    /// Create a controller with an explicit starting header.
    pub fn with_header(transport: T, header: Header) -> Self {
        Self {
            framer: FrameBuilder::new(header),
            transport,
        }
    }

    /// Send `payload` at the current offset. Returns bytes written,
    /// header included.
    pub fn write(&mut self, payload: &[u8]) -> Result<usize> {
        let datagram = self.framer.frame(payload)?;
        let written = self
            .transport
            .send_datagram(datagram)
            .map_err(TransportError::Io)?;
        trace!(
            sequence = self.framer.header().sequence_number,
            id = self.framer.header().destination_id,
            offset = self.framer.header().offset,
            written,
            "sent ddp datagram"
        );
        Ok(written)
    }

    /// Set the offset, then [`Controller::write`]. The offset sticks for
    /// later writes.
    pub fn write_at(&mut self, payload: &[u8], offset: u32) -> Result<usize> {
        self.framer.set_offset(offset);
        self.write(payload)
    }

    pub fn header(&self) -> &Header {
        self.framer.header()
    }

    /// Replace the whole header.
    pub fn set_header(&mut self, header: Header) {
        self.framer.set_header(header);
    }

    /// Address a destination ID. Fails for the reserved ID 0.
    pub fn set_destination(&mut self, destination_id: u8) -> Result<()> {
        self.framer.set_destination(destination_id)
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.framer.set_offset(offset);
    }

    /// 0 disables sequencing.
    pub fn set_sequence_number(&mut self, sequence_number: u8) {
        self.framer.set_sequence_number(sequence_number);
    }

    pub fn set_pixel_format(&mut self, pixel_format: PixelFormat) {
        self.framer.set_pixel_format(pixel_format);
    }

    pub fn set_flags(&mut self, flags: ConfigFlags) {
        self.framer.set_flags(flags);
    }

    /// Attach `timecode` to every subsequent datagram.
    pub fn enable_timecode(&mut self, timecode: u32) {
        self.framer.enable_timecode(timecode);
    }

    pub fn disable_timecode(&mut self) {
        self.framer.disable_timecode();
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the controller and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T> std::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("header", self.framer.header())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use ddpkit_proto::{decode_packet, MAX_PAYLOAD};

    use super::*;
    use crate::error::PeerError;

    #[derive(Default)]
    struct RecordingSink {
        datagrams: Vec<Vec<u8>>,
    }

    impl DatagramSink for RecordingSink {
        fn send_datagram(&mut self, datagram: &[u8]) -> std::io::Result<usize> {
            self.datagrams.push(datagram.to_vec());
            Ok(datagram.len())
        }
    }

    struct FailingSink;

    impl DatagramSink for FailingSink {
        fn send_datagram(&mut self, _datagram: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::ConnectionRefused))
        }
    }

    fn controller() -> Controller<RecordingSink> {
        Controller::new(RecordingSink::default())
    }

    fn last(controller: &Controller<RecordingSink>) -> &[u8] {
        controller
            .get_ref()
            .datagrams
            .last()
            .expect("a datagram should have been sent")
    }

    #[test]
    fn write_complete_packet() {
        let mut c = controller();
        c.set_header(Header {
            sequence_number: 5,
            pixel_format: PixelFormat::rgb8(),
            ..Header::default()
        });
        c.set_destination(1).unwrap();
        c.set_offset(0);

        let pixels = [255, 0, 0, 0, 255, 0];
        let written = c.write(&pixels).unwrap();
        assert_eq!(written, 16);

        let wire = last(&c);
        assert_eq!(&wire[..10], &[0x41, 6, 0x0B, 1, 0, 0, 0, 0, 0, 6]);
        assert_eq!(&wire[10..], &pixels);
    }

    #[test]
    fn sequence_numbers_wrap_after_sixteen() {
        let mut c = controller();
        c.set_sequence_number(14);

        let mut seen = Vec::new();
        for _ in 0..4 {
            c.write(&[0xFF, 0x00, 0xFF]).unwrap();
            seen.push(last(&c)[1]);
        }
        assert_eq!(seen, vec![15, 16, 1, 2]);
    }

    #[test]
    fn sequence_zero_stays_disabled() {
        let mut c = controller();
        c.set_sequence_number(0);
        c.write(&[1, 2, 3]).unwrap();
        c.write(&[1, 2, 3]).unwrap();
        assert_eq!(last(&c)[1], 0);
        assert_eq!(c.header().sequence_number, 0);
    }

    #[test]
    fn empty_payload_sends_bare_header() {
        let mut c = controller();
        let written = c.write(&[]).unwrap();
        assert_eq!(written, 10);
        assert_eq!(&last(&c)[8..10], &[0, 0]);
    }

    #[test]
    fn max_payload_boundary() {
        let mut c = controller();
        assert_eq!(c.write(&vec![7; MAX_PAYLOAD]).unwrap(), 10 + MAX_PAYLOAD);
        assert_eq!(c.get_ref().datagrams.len(), 1);

        let err = c.write(&vec![7; MAX_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(err, PeerError::PayloadTooLarge { .. }));
        assert_eq!(c.get_ref().datagrams.len(), 1, "nothing sent on overflow");
    }

    #[test]
    fn write_at_moves_offset() {
        let mut c = controller();
        c.write_at(&[1, 2, 3], 300).unwrap();
        let (packet, _) = decode_packet(last(&c).to_vec().into()).unwrap();
        assert_eq!(packet.header.offset, 300);
        assert_eq!(packet.payload.as_ref(), &[1, 2, 3]);

        c.write(&[4, 5, 6]).unwrap();
        let (packet, _) = decode_packet(last(&c).to_vec().into()).unwrap();
        assert_eq!(packet.header.offset, 300);
    }

    #[test]
    fn length_tracks_each_write() {
        let mut c = controller();
        for size in [3usize, 30, 0, 1440] {
            c.write(&vec![0; size]).unwrap();
            let wire = last(&c);
            assert_eq!(usize::from(u16::from_be_bytes([wire[8], wire[9]])), size);
        }
    }

    #[test]
    fn timecode_header_on_the_wire() {
        let mut c = controller();
        c.enable_timecode(0xABCD_1234);
        c.write(&[0xFF, 0x00, 0xFF]).unwrap();

        let wire = last(&c);
        assert_eq!(wire.len(), 17);
        assert_eq!(wire[0] & 0x10, 0x10);
        assert_eq!(&wire[10..14], &[0xAB, 0xCD, 0x12, 0x34]);

        c.disable_timecode();
        c.write(&[0xFF, 0x00, 0xFF]).unwrap();
        assert_eq!(last(&c).len(), 13);
    }

    #[test]
    fn default_controller_sends_plain_header() {
        let mut c = controller();
        c.write(&[255, 0, 0]).unwrap();
        let wire = last(&c);
        assert_eq!(wire.len(), 13);
        assert_eq!(wire[0], 0x41);
        assert_eq!(wire[2], 0x0D);
        assert_eq!(wire[3], 1);
    }

    #[test]
    fn reserved_destination_rejected() {
        let mut c = controller();
        assert!(matches!(
            c.set_destination(0),
            Err(PeerError::ReservedIdentifier(0))
        ));
        assert_eq!(c.header().destination_id, 1);

        for id in [1u8, 2, 249, 250, 251, 254, 255] {
            c.set_destination(id).unwrap();
            assert_eq!(c.header().destination_id, id);
        }
    }

    #[test]
    fn transport_failure_does_not_roll_back() {
        let mut c = Controller::new(FailingSink);
        let err = c.write(&[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, PeerError::Transport(TransportError::Io(_))));
        assert_eq!(c.header().sequence_number, 2);
        assert_eq!(c.header().length, 4);
    }

    #[test]
    fn connect_over_udp() {
        let receiver = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();
        let addr = receiver.local_addr().unwrap().to_string();

        let mut c = Controller::connect(&addr).unwrap();
        c.write(&[10, 20, 30]).unwrap();

        let mut buf = [0u8; 64];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(n, 13);
        assert_eq!(&buf[10..13], &[10, 20, 30]);
    }
}
