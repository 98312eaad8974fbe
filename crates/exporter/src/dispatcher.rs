//! Fan-out of finished takes to every configured sink.
//!
//! A failing sink is logged and counted; the remaining sinks still run.

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{MotionArchive, MotionSink, ProcessingConfig, SinkConfig, SinkType, Subject};
use skeleton::BodyModel;
use tracing::{error, info, instrument};

use crate::error::{ExportError, Result};
use crate::sinks::{LogSink, SequenceLogSink, StoreSink, TrcSink};

/// Create a sink from its blueprint entry
#[instrument(
    name = "exporter_create_sink",
    skip(config, model, processing),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink(
    config: &SinkConfig,
    model: &BodyModel,
    processing: &ProcessingConfig,
) -> Result<Box<dyn MotionSink>> {
    let sink: Box<dyn MotionSink> = match config.sink_type {
        SinkType::Log => Box::new(LogSink::new(&config.name)),
        SinkType::Store => Box::new(StoreSink::from_params(
            &config.name,
            &config.params,
            model.joint_count(),
        )?),
        SinkType::Trc => Box::new(TrcSink::from_params(
            &config.name,
            &config.params,
            model,
            processing.frame_rate(),
        )?),
        SinkType::SequenceLog => {
            Box::new(SequenceLogSink::from_params(&config.name, &config.params)?)
        }
    };
    Ok(sink)
}

/// Write counters of one sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    write_count: AtomicU64,
    failure_count: AtomicU64,
}

impl SinkMetrics {
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    fn record(&self, ok: bool) {
        let counter = if ok {
            &self.write_count
        } else {
            &self.failure_count
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub written: usize,
    /// Names of the sinks that failed
    pub failed: Vec<String>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

struct SinkSlot {
    sink: Box<dyn MotionSink>,
    metrics: SinkMetrics,
}

/// Synchronous fan-out over a fixed set of sinks
pub struct Dispatcher {
    slots: Vec<SinkSlot>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Box<dyn MotionSink>>) -> Self {
        Self {
            slots: sinks
                .into_iter()
                .map(|sink| SinkSlot {
                    sink,
                    metrics: SinkMetrics::default(),
                })
                .collect(),
        }
    }

    /// Build every sink of a blueprint; the first failure aborts.
    pub fn from_configs(
        configs: &[SinkConfig],
        model: &BodyModel,
        processing: &ProcessingConfig,
    ) -> Result<Self> {
        let sinks = configs
            .iter()
            .map(|c| create_sink(c, model, processing))
            .collect::<Result<Vec<_>>>()?;
        info!(sinks = sinks.len(), "sinks created");
        Ok(Self::new(sinks))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.sink.name()).collect()
    }

    /// Metrics for all sinks
    pub fn metrics(&self) -> Vec<(&str, &SinkMetrics)> {
        self.slots
            .iter()
            .map(|s| (s.sink.name(), &s.metrics))
            .collect()
    }

    #[instrument(name = "exporter_dispatch", skip(self, archive), fields(subject = %subject, sinks = self.slots.len()))]
    pub fn dispatch(&mut self, subject: Subject, archive: &MotionArchive) -> DispatchReport {
        let mut report = DispatchReport::default();
        for slot in &mut self.slots {
            let result = slot.sink.write(subject, archive);
            let ok = result.is_ok();
            slot.metrics.record(ok);
            observability::record_sink_write(slot.sink.name(), ok);
            match result {
                Ok(()) => report.written += 1,
                Err(e) => {
                    error!(sink = slot.sink.name(), error = %e, "sink write failed");
                    report.failed.push(slot.sink.name().to_string());
                }
            }
        }
        report
    }

    /// Flush every sink; returns the first error after trying all of them.
    pub fn flush(&mut self) -> Result<()> {
        let mut first_error = None;
        for slot in &mut self.slots {
            if let Err(e) = slot.sink.flush() {
                error!(sink = slot.sink.name(), error = %e, "sink flush failed");
                first_error.get_or_insert_with(|| {
                    ExportError::Format(format!("flush of '{}' failed: {e}", slot.sink.name()))
                });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
