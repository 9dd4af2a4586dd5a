use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::codec::{self, DecodeError, MAX_PACKET_SIZE, RawSample};
use super::stats::{NetworkStats, PacketLossSimulation, SharedStats};

const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
/// Back-to-back read failures tolerated before the socket is considered dead.
const MAX_CONSECUTIVE_ERRORS: u32 = 32;

/// Outcome of a single datagram read.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Sample(RawSample, SocketAddr),
    Dropped(DecodeError, SocketAddr),
    /// Read timed out or hit a transient error; check `running` and retry.
    Idle,
}

/// Connectionless UDP endpoint carrying sample packets.
///
/// Reads block for at most the poll interval so a receive loop can observe
/// [`NetworkEndpoint::shutdown`] without a socket close.
pub struct NetworkEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote_addr: Option<SocketAddr>,
    stats: Arc<SharedStats>,
    recv_buffer: Vec<u8>,
    packet_loss_sim: PacketLossSimulation,
    consecutive_errors: u32,
    running: Arc<AtomicBool>,
}

impl NetworkEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Self::bind_with_buffer(addr, MAX_PACKET_SIZE)
    }

    pub fn bind_with_buffer<A: ToSocketAddrs>(addr: A, buffer_size: usize) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)))?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            remote_addr: None,
            stats: Arc::new(SharedStats::default()),
            recv_buffer: vec![0u8; buffer_size.max(MAX_PACKET_SIZE)],
            packet_loss_sim: PacketLossSimulation::default(),
            consecutive_errors: 0,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Ephemeral local port aimed at `remote`.
    pub fn sender(remote: SocketAddr) -> io::Result<Self> {
        let local = if remote.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let mut endpoint = Self::bind(local)?;
        endpoint.set_remote(remote);
        Ok(endpoint)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn set_remote(&mut self, addr: SocketAddr) {
        self.remote_addr = Some(addr);
    }

    pub fn set_poll_interval(&mut self, interval: Duration) -> io::Result<()> {
        self.socket.set_read_timeout(Some(interval))
    }

    pub fn set_packet_loss_sim(&mut self, sim: PacketLossSimulation) {
        self.packet_loss_sim = sim;
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats.snapshot()
    }

    pub fn shared_stats(&self) -> Arc<SharedStats> {
        Arc::clone(&self.stats)
    }

    /// Fire-and-forget. Returns 0 when the loss simulation ate the packet.
    pub fn send_sample_to(&mut self, sample: &RawSample, addr: SocketAddr) -> io::Result<usize> {
        let data = codec::encode(sample);

        if data.len() > MAX_PACKET_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Packet exceeds buffer size",
            ));
        }

        if self.packet_loss_sim.should_drop() {
            self.stats.record_lost();
            return Ok(0);
        }

        let bytes = self.socket.send_to(&data, addr)?;
        self.stats.record_sent(bytes);

        Ok(bytes)
    }

    pub fn send_sample(&mut self, sample: &RawSample) -> io::Result<usize> {
        let addr = self
            .remote_addr
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "No remote address set"))?;
        self.send_sample_to(sample, addr)
    }

    pub fn send_raw_to(&self, data: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(data, addr)
    }

    /// Reads one datagram.
    ///
    /// Per-datagram failures (oversized packets, ICMP resets, ...) are logged
    /// and reported as `Idle`. `Err` only after a run of
    /// `MAX_CONSECUTIVE_ERRORS` failures with no datagram in between.
    pub fn receive(&mut self) -> io::Result<Received> {
        match self.socket.recv_from(&mut self.recv_buffer) {
            Ok((size, addr)) => {
                self.consecutive_errors = 0;
                self.stats.record_received(size);

                match codec::decode(&self.recv_buffer[..size]) {
                    Ok(sample) => Ok(Received::Sample(sample, addr)),
                    Err(e) => {
                        if e.is_validation() {
                            self.stats.record_invalid();
                        } else {
                            self.stats.record_malformed();
                        }
                        Ok(Received::Dropped(e, addr))
                    }
                }
            }
            Err(ref e) if is_idle(e) => Ok(Received::Idle),
            Err(e) => self.receive_failed(e),
        }
    }

    fn receive_failed(&mut self, e: io::Error) -> io::Result<Received> {
        self.stats.record_receive_error();
        self.consecutive_errors += 1;

        if self.consecutive_errors > MAX_CONSECUTIVE_ERRORS {
            return Err(e);
        }

        log::warn!("Receive error ({}), continuing: {}", self.consecutive_errors, e);
        Ok(Received::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_remote_fails() {
        let mut endpoint = NetworkEndpoint::bind("127.0.0.1:0").unwrap();
        let err = endpoint
            .send_sample(&RawSample::default())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_idle_when_nothing_arrives() {
        let mut endpoint = NetworkEndpoint::bind("127.0.0.1:0").unwrap();
        endpoint
            .set_poll_interval(Duration::from_millis(5))
            .unwrap();
        assert_eq!(endpoint.receive().unwrap(), Received::Idle);
    }

    #[test]
    fn test_simulated_loss_counts_without_sending() {
        let mut endpoint = NetworkEndpoint::sender("127.0.0.1:9".parse().unwrap()).unwrap();
        endpoint.set_packet_loss_sim(PacketLossSimulation::with_loss(100.0));

        assert_eq!(endpoint.send_sample(&RawSample::default()).unwrap(), 0);

        let stats = endpoint.stats();
        assert_eq!(stats.packets_lost, 1);
        assert_eq!(stats.packets_sent, 0);
    }

    #[test]
    fn test_shutdown_flag() {
        let endpoint = NetworkEndpoint::bind("127.0.0.1:0").unwrap();
        let running = endpoint.running();
        assert!(endpoint.is_running());
        endpoint.shutdown();
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_idle_kinds_are_not_errors() {
        for kind in [
            io::ErrorKind::WouldBlock,
            io::ErrorKind::TimedOut,
            io::ErrorKind::Interrupted,
        ] {
            assert!(is_idle(&io::Error::from(kind)));
        }
        assert!(!is_idle(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_idle(&io::Error::other("message too long")));
    }

    #[test]
    fn test_unknown_receive_error_keeps_loop_alive() {
        let mut endpoint = NetworkEndpoint::bind("127.0.0.1:0").unwrap();

        // e.g. an oversized datagram on Windows surfaces as an uncategorized error
        let result = endpoint.receive_failed(io::Error::other("message too long"));
        assert_eq!(result.unwrap(), Received::Idle);
        let result = endpoint.receive_failed(io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(result.unwrap(), Received::Idle);

        assert_eq!(endpoint.stats().receive_errors, 2);
    }

    #[test]
    fn test_persistent_errors_become_fatal() {
        let mut endpoint = NetworkEndpoint::bind("127.0.0.1:0").unwrap();

        for _ in 0..MAX_CONSECUTIVE_ERRORS {
            assert!(endpoint.receive_failed(io::Error::other("bad socket")).is_ok());
        }
        assert!(endpoint.receive_failed(io::Error::other("bad socket")).is_err());
    }

    #[test]
    fn test_datagram_resets_error_run() {
        let mut endpoint = NetworkEndpoint::bind("127.0.0.1:0").unwrap();
        let addr = endpoint.local_addr();

        for _ in 0..MAX_CONSECUTIVE_ERRORS {
            endpoint.receive_failed(io::Error::other("flaky")).unwrap();
        }

        endpoint.send_sample_to(&RawSample::default(), addr).unwrap();
        let start = std::time::Instant::now();
        loop {
            match endpoint.receive().unwrap() {
                Received::Sample(..) => break,
                _ => assert!(start.elapsed() < Duration::from_secs(2), "no datagram"),
            }
        }

        assert!(endpoint.receive_failed(io::Error::other("flaky")).is_ok());
    }
}
