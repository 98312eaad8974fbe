//! 姿态数据流
//!
//! 将 `PoseSource` 的回调转发到有界 async-channel，供异步消费者读取。
//! 通道满时丢弃最新样本并计数，不阻塞数据源线程。

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{PoseCallback, PoseSample, PoseSource};
use tracing::{debug, info, instrument, trace, warn};

use crate::config::{IngestionMetrics, StreamConfig};
use crate::error::{IngestionError, Result};

/// 姿态数据流
///
/// 持有数据源与通道两端；接收端只能取走一次。
pub struct PoseStream {
    source: Box<dyn PoseSource>,
    metrics: Arc<IngestionMetrics>,
    tx: Sender<PoseSample>,
    rx: Option<Receiver<PoseSample>>,
}

impl PoseStream {
    /// 创建新的数据流
    pub fn new(source: Box<dyn PoseSource>, config: StreamConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity.max(1));
        Self {
            source,
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
        }
    }

    pub fn source_id(&self) -> &str {
        self.source.source_id()
    }

    pub fn joint_count(&self) -> usize {
        self.source.joint_count()
    }

    /// 启动数据源
    ///
    /// # Errors
    /// 数据源已在监听时返回 `AlreadyListening`。
    #[instrument(name = "pose_stream_start", skip(self), fields(source_id = %self.source.source_id()))]
    pub fn start(&self) -> Result<()> {
        if self.source.is_listening() {
            return Err(IngestionError::AlreadyListening {
                source_id: self.source.source_id().to_string(),
            });
        }

        let tx = self.tx.clone();
        let metrics = self.metrics.clone();
        let source_id = self.source.source_id().to_string();

        let callback: PoseCallback = Arc::new(move |sample| {
            metrics.record_received();
            observability::record_sample_received(&source_id);
            forward_sample(&tx, sample, &metrics, &source_id);
        });

        self.source.listen(callback);
        info!("pose stream started");
        Ok(())
    }

    /// 停止数据源
    pub fn stop(&self) {
        if self.source.is_listening() {
            debug!(source_id = %self.source.source_id(), "stopping pose stream");
            self.source.stop();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.source.is_listening()
    }

    /// 获取数据接收端
    ///
    /// 只能调用一次，之后返回 None
    pub fn take_receiver(&mut self) -> Option<Receiver<PoseSample>> {
        self.rx.take()
    }

    /// 获取 metrics 引用
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }
}

impl Drop for PoseStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 发送样本；通道满时丢弃最新样本
#[inline]
fn forward_sample(
    tx: &Sender<PoseSample>,
    sample: PoseSample,
    metrics: &IngestionMetrics,
    source_id: &str,
) {
    match tx.try_send(sample) {
        Ok(()) => {
            metrics.update_queue_len(tx.len());
            trace!(source_id = %source_id, "sample forwarded");
        }
        Err(TrySendError::Full(_)) => {
            metrics.record_dropped();
            observability::record_sample_dropped(source_id);
            trace!(source_id = %source_id, "sample dropped (channel full)");
        }
        Err(TrySendError::Closed(_)) => {
            warn!(source_id = %source_id, "channel closed");
        }
    }
}
