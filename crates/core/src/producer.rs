use std::io;
use std::net::SocketAddr;

use crate::config::TrackingConfig;
use crate::filter::PreFilter;
use crate::net::{NetworkEndpoint, NetworkStats, PacketLossSimulation, RawSample};

/// Producer side: pre-filter each raw sample and send it fire-and-forget.
pub struct SampleProducer {
    pre_filter: PreFilter,
    endpoint: NetworkEndpoint,
}

impl SampleProducer {
    pub fn new(config: &TrackingConfig) -> io::Result<Self> {
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let endpoint = NetworkEndpoint::sender(config.endpoint.addr)?;
        Ok(Self::with_endpoint(PreFilter::new(config.pre_filter), endpoint))
    }

    pub fn with_endpoint(pre_filter: PreFilter, endpoint: NetworkEndpoint) -> Self {
        Self {
            pre_filter,
            endpoint,
        }
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.endpoint.remote_addr()
    }

    pub fn set_packet_loss_sim(&mut self, sim: PacketLossSimulation) {
        self.endpoint.set_packet_loss_sim(sim);
    }

    pub fn stats(&self) -> NetworkStats {
        self.endpoint.stats()
    }

    /// Smooths and sends one sample, returning what went on the wire.
    ///
    /// Send failures are logged and swallowed; delivery is never confirmed.
    pub fn submit(&mut self, sample: RawSample) -> RawSample {
        let smoothed = self.pre_filter.push(sample);
        if let Err(e) = self.endpoint.send_sample(&smoothed) {
            log::warn!("Failed to send sample: {}", e);
        }
        smoothed
    }
}
