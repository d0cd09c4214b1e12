use ddpkit_proto::{ConfigFlags, Header, PixelFormat};
use ddpkit_transport::AsyncUdpSender;
use tracing::trace;

use crate::error::Result;
use crate::framing::FrameBuilder;

/// Tokio counterpart of [`crate::Controller`].
///
/// Same header state machine; only the send is async.
#[derive(Debug)]
pub struct AsyncController {
    framer: FrameBuilder,
    transport: AsyncUdpSender,
}

impl AsyncController {
    /// Connect to a display over UDP (port 4048 unless `addr` names one).
    pub async fn connect(addr: &str) -> Result<Self> {
        let transport = AsyncUdpSender::connect(addr).await?;
        Ok(Self::new(transport))
    }

    pub fn new(transport: AsyncUdpSender) -> Self {
        Self::with_header(transport, Header::default())
    }

    pub fn with_header(transport: AsyncUdpSender, header: Header) -> Self {
        Self {
            framer: FrameBuilder::new(header),
            transport,
        }
    }

    /// Send `payload` at the current offset. Returns bytes written,
    /// header included.
    pub async fn write(&mut self, payload: &[u8]) -> Result<usize> {
        let datagram = self.framer.frame(payload)?;
        let written = self.transport.send_datagram(datagram).await?;
        trace!(
            sequence = self.framer.header().sequence_number,
            id = self.framer.header().destination_id,
            written,
            "sent ddp datagram"
        );
        Ok(written)
    }

    pub async fn write_at(&mut self, payload: &[u8], offset: u32) -> Result<usize> {
        self.framer.set_offset(offset);
        self.write(payload).await
    }

    pub fn header(&self) -> &Header {
        self.framer.header()
    }

    pub fn set_header(&mut self, header: Header) {
        self.framer.set_header(header);
    }

    /// Fails for the reserved ID 0.
    pub fn set_destination(&mut self, destination_id: u8) -> Result<()> {
        self.framer.set_destination(destination_id)
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.framer.set_offset(offset);
    }

    pub fn set_sequence_number(&mut self, sequence_number: u8) {
        self.framer.set_sequence_number(sequence_number);
    }

    pub fn set_pixel_format(&mut self, pixel_format: PixelFormat) {
        self.framer.set_pixel_format(pixel_format);
    }

    pub fn set_flags(&mut self, flags: ConfigFlags) {
        self.framer.set_flags(flags);
    }

    pub fn enable_timecode(&mut self, timecode: u32) {
        self.framer.enable_timecode(timecode);
    }

    pub fn disable_timecode(&mut self) {
        self.framer.disable_timecode();
    }

    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.transport.peer_addr()
    }
}
