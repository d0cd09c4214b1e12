use std::net::UdpSocket;

/// Outbound datagram transport.
///
/// Each call must emit exactly one datagram containing all of `datagram`.
/// Unlike `std::io::Write`, a short write is not retried: for datagram
/// transports a partial send would split one protocol packet in two.
pub trait DatagramSink {
    /// Send one datagram, returning the number of bytes sent.
    fn send_datagram(&mut self, datagram: &[u8]) -> std::io::Result<usize>;
}

/// A connected `UdpSocket` sends to its connected peer.
impl DatagramSink for UdpSocket {
    fn send_datagram(&mut self, datagram: &[u8]) -> std::io::Result<usize> {
        self.send(datagram)
    }
}

impl<S: DatagramSink + ?Sized> DatagramSink for &mut S {
    fn send_datagram(&mut self, datagram: &[u8]) -> std::io::Result<usize> {
        (**self).send_datagram(datagram)
    }
}

impl<S: DatagramSink + ?Sized> DatagramSink for Box<S> {
    fn send_datagram(&mut self, datagram: &[u8]) -> std::io::Result<usize> {
        (**self).send_datagram(datagram)
    }
}
