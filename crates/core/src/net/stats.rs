use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct PacketLossSimulation {
    pub enabled: bool,
    /// 0-100
    pub loss_percent: f32,
}

impl PacketLossSimulation {
    pub fn with_loss(loss_percent: f32) -> Self {
        Self {
            enabled: loss_percent > 0.0,
            loss_percent: loss_percent.clamp(0.0, 100.0),
        }
    }

    pub fn should_drop(&self) -> bool {
        if !self.enabled || self.loss_percent <= 0.0 {
            return false;
        }
        if self.loss_percent >= 100.0 {
            return true;
        }
        rand_percent() * 100.0 < self.loss_percent
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    /// Dropped locally by [`PacketLossSimulation`].
    pub packets_lost: u64,
    pub packets_malformed: u64,
    pub packets_invalid: u64,
    pub receive_errors: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl NetworkStats {
    pub fn packets_dropped(&self) -> u64 {
        self.packets_malformed + self.packets_invalid
    }
}

/// Counters updated by the network thread and read from anywhere.
#[derive(Debug, Default)]
pub struct SharedStats {
    packets_sent: AtomicU64,
    packets_received: AtomicU64,
    packets_lost: AtomicU64,
    packets_malformed: AtomicU64,
    packets_invalid: AtomicU64,
    receive_errors: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl SharedStats {
    pub fn record_sent(&self, bytes: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_lost(&self) {
        self.packets_lost.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self, bytes: usize) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.packets_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.packets_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> NetworkStats {
        NetworkStats {
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            packets_lost: self.packets_lost.load(Ordering::Relaxed),
            packets_malformed: self.packets_malformed.load(Ordering::Relaxed),
            packets_invalid: self.packets_invalid.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

pub fn rand_percent() -> f32 {
    rand_u64() as f32 / u64::MAX as f32
}

pub fn rand_u64() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::time::Instant;

    let mut hasher = DefaultHasher::new();
    Instant::now().hash(&mut hasher);
    hasher.finish()
}
