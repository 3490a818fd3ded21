use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::{Context, Result};
use protocol::{Inbound, Outbound};
use tracing::warn;

use crate::OutboundSink;

const RECV_TIMEOUT: Duration = Duration::from_millis(50);
const MAX_DATAGRAM: usize = 1500;

/// Source of inbound events. `Ok(None)` means nothing arrived in time.
pub trait InboundSource {
    fn recv(&mut self) -> Result<Option<Inbound>>;
}

/// Inbound socket. `recv` wakes at least every 50 ms so the node loop can
/// observe its shutdown flag.
#[derive(Debug)]
pub struct UdpLink {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpLink {
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).with_context(|| format!("failed to bind {addr}"))?;
        socket.set_read_timeout(Some(RECV_TIMEOUT)).context("failed to set read timeout")?;
        Ok(Self { socket, buf: vec![0; MAX_DATAGRAM] })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> { Ok(self.socket.local_addr()?) }
}

impl InboundSource for UdpLink {
    /// `Ok(None)` on timeout or an undecodable datagram.
    fn recv(&mut self) -> Result<Option<Inbound>> {
        let (len, from) = match self.socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => return Ok(None),
            Err(err) => return Err(err).context("udp receive failed"),
        };
        match protocol::decode::<Inbound>(&self.buf[..len]) {
            Ok(msg) => Ok(Some(msg)),
            Err(err) => {
                warn!(%from, len, error = %err, "Dropping undecodable datagram");
                Ok(None)
            }
        }
    }
}

/// Outbound socket sending every message to one fixed destination.
#[derive(Debug)]
pub struct UdpPublisher {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpPublisher {
    pub fn bind(ip: IpAddr, target: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::new(ip, 0)).context("failed to bind publisher socket")?;
        Ok(Self { socket, target })
    }
}

impl OutboundSink for UdpPublisher {
    fn publish(&mut self, msg: Outbound) -> Result<()> {
        let bytes = protocol::encode(&msg)?;
        let target = self.target;
        self.socket.send_to(&bytes, target).with_context(|| format!("failed to send to {target}"))?;
        Ok(())
    }
}
