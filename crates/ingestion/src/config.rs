//! Stream configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::CaptureConfig;

/// Stream configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Channel capacity; when full the newest sample is dropped
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

impl StreamConfig {
    pub fn new(channel_capacity: usize) -> Self {
        Self { channel_capacity }
    }
}

impl From<&CaptureConfig> for StreamConfig {
    fn from(config: &CaptureConfig) -> Self {
        Self::new(config.channel_capacity)
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total samples received from the source
    pub samples_received: AtomicU64,

    /// Total samples dropped on a full channel
    pub samples_dropped: AtomicU64,

    /// Queue length after the last send
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.samples_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub samples_received: u64,
    pub samples_dropped: u64,
    pub queue_len: usize,
}
