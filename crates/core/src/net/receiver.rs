use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::config::TrackingConfig;
use crate::latest::LatestValue;
use crate::pipeline::{FrameUpdate, TrackingPipeline};

use super::endpoint::{NetworkEndpoint, Received};
use super::stats::{NetworkStats, SharedStats};

/// Consumer receive loop: datagram in, [`FrameUpdate`] published to a
/// latest-value slot.
pub struct ReceiveLoop {
    endpoint: NetworkEndpoint,
    pipeline: TrackingPipeline,
    output: Arc<LatestValue<FrameUpdate>>,
}

impl ReceiveLoop {
    pub fn bind(config: &TrackingConfig) -> io::Result<Self> {
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let endpoint =
            NetworkEndpoint::bind_with_buffer(config.endpoint.addr, config.endpoint.buffer_size)?;
        Ok(Self::with_endpoint(endpoint, TrackingPipeline::new(config)))
    }

    pub fn with_endpoint(endpoint: NetworkEndpoint, pipeline: TrackingPipeline) -> Self {
        Self {
            endpoint,
            pipeline,
            output: Arc::new(LatestValue::new()),
        }
    }

    pub fn output(&self) -> Arc<LatestValue<FrameUpdate>> {
        Arc::clone(&self.output)
    }

    /// Handles one read. `Ok(true)` when a frame was published.
    pub fn poll_once(&mut self) -> io::Result<bool> {
        match self.endpoint.receive()? {
            Received::Sample(sample, addr) => {
                log::trace!("sample from {}: {:?}", addr, sample);
                let update = self.pipeline.process(&sample);
                // The transform is overwritten, the gesture is latched until read.
                self.output
                    .publish_merge(update, |pending, next| next.gesture |= pending.gesture);
                Ok(true)
            }
            Received::Dropped(e, addr) => {
                log::warn!("Dropping packet from {}: {}", addr, e);
                Ok(false)
            }
            Received::Idle => Ok(false),
        }
    }

    /// Runs until shutdown or an unrecoverable socket error.
    pub fn run(mut self) -> io::Result<()> {
        log::info!("Listening on {}", self.endpoint.local_addr());

        let result = loop {
            if !self.endpoint.is_running() {
                break Ok(());
            }
            if let Err(e) = self.poll_once() {
                log::error!("Receive loop stopped: {}", e);
                break Err(e);
            }
        };

        let stats = self.endpoint.stats();
        log::info!(
            "Receive loop exiting: {} packets, {} dropped, {} samples applied",
            stats.packets_received,
            stats.packets_dropped(),
            self.pipeline.processed()
        );
        result
    }

    pub fn spawn(self) -> io::Result<ReceiverHandle> {
        let running = self.endpoint.running();
        let stats = self.endpoint.shared_stats();
        let output = self.output();
        let local_addr = self.endpoint.local_addr();

        let thread = thread::Builder::new()
            .name("handlink-recv".to_string())
            .spawn(move || self.run())?;

        Ok(ReceiverHandle {
            running,
            stats,
            output,
            local_addr,
            thread,
        })
    }
}

/// Application-side handle to a spawned [`ReceiveLoop`].
pub struct ReceiverHandle {
    running: Arc<AtomicBool>,
    stats: Arc<SharedStats>,
    output: Arc<LatestValue<FrameUpdate>>,
    local_addr: std::net::SocketAddr,
    thread: JoinHandle<io::Result<()>>,
}

impl ReceiverHandle {
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Newest unconsumed frame, if any.
    pub fn take_latest(&self) -> Option<FrameUpdate> {
        self.output.take()
    }

    pub fn output(&self) -> Arc<LatestValue<FrameUpdate>> {
        Arc::clone(&self.output)
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn join(self) -> io::Result<()> {
        self.shutdown();
        self.thread
            .join()
            .map_err(|_| io::Error::other("receive thread panicked"))?
    }
}
