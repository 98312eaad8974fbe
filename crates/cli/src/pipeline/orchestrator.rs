//! Capture orchestrator - drives a pose source through a capture session.
//!
//! The live path forwards a threaded `MockPoseSource` over an async channel
//! and consumes it on the tokio runtime; the offline path pulls samples from a
//! `PoseGenerator` as fast as the pipeline accepts them. Both toggle the
//! recorder on the source clock, so a take always spans `lead_in_s` of idle
//! samples followed by `record_s` of recording.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{CaptureBlueprint, CaptureConfig, MotionArchive, Subject};
use exporter::Dispatcher;
use ingestion::{MockPoseConfig, MockPoseSource, PoseGenerator, PoseStream, RecorderState, StreamConfig};
use motion_engine::CaptureSession;
use skeleton::BodyModel;
use tracing::{debug, info, warn};

use super::CaptureStats;
use crate::error::CliError;

/// Starts and stops takes at fixed offsets of the source clock.
#[derive(Debug, Clone, Copy)]
pub struct TakeClock {
    lead_in: f64,
    record: f64,
    origin: Option<f64>,
}

impl TakeClock {
    pub fn new(capture: &CaptureConfig) -> Self {
        Self {
            lead_in: capture.lead_in_s,
            record: capture.record_s,
            origin: None,
        }
    }

    /// Toggle the session for a sample stamped `timestamp`; call before feeding it.
    pub fn advance(&mut self, session: &mut CaptureSession, subject: Subject, timestamp: f64) {
        let origin = *self.origin.get_or_insert(timestamp);
        let elapsed = timestamp - origin;
        match session.recorder().state() {
            RecorderState::Idle if elapsed >= self.lead_in => {
                session.start_recording(subject);
            }
            RecorderState::Recording if elapsed >= self.lead_in + self.record => {
                session.stop_recording();
            }
            _ => {}
        }
    }

    /// Next take measures its lead-in from the next sample.
    pub fn rewind(&mut self) {
        self.origin = None;
    }
}

/// Live capture of one take
pub struct CaptureOrchestrator {
    blueprint: CaptureBlueprint,
    model: Arc<BodyModel>,
    source_timeout: Duration,
}

impl CaptureOrchestrator {
    pub fn new(blueprint: CaptureBlueprint, model: Arc<BodyModel>, source_timeout: Duration) -> Self {
        Self {
            blueprint,
            model,
            source_timeout,
        }
    }

    /// Record one take of `capture.subject` and hand it to `dispatcher`.
    ///
    /// Resolving `shutdown` aborts an unfinished take; the archive is then
    /// returned as it was and nothing is dispatched.
    pub async fn run(
        self,
        dispatcher: &mut Dispatcher,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(CaptureStats, MotionArchive)> {
        let started = Instant::now();
        let capture = &self.blueprint.capture;
        let subject = capture.subject;

        let mut session = CaptureSession::new(self.model.clone(), self.blueprint.processing.clone())
            .context("Failed to create capture session")?;
        let mut clock = TakeClock::new(capture);

        let source = MockPoseSource::new(
            "mock",
            MockPoseConfig::from(&self.blueprint.source),
            rest_pose(&self.model),
        );
        let mut stream = PoseStream::new(Box::new(source), StreamConfig::from(capture));
        let rx = stream.take_receiver().ok_or(CliError::StreamClosed)?;
        stream.start().context("Failed to start pose stream")?;

        info!(
            subject = %subject,
            lead_in_s = capture.lead_in_s,
            record_s = capture.record_s,
            "capture running"
        );

        let mut stats = CaptureStats::default();
        tokio::pin!(shutdown);

        loop {
            let sample = tokio::select! {
                _ = &mut shutdown => {
                    warn!(state = session.recorder().state().as_str(), "interrupted, aborting take");
                    session.abort();
                    stats.aborted = true;
                    break;
                }
                received = tokio::time::timeout(self.source_timeout, rx.recv()) => match received {
                    Err(_) => {
                        return Err(CliError::source_timeout(
                            stream.source_id(),
                            self.source_timeout.as_secs(),
                        )
                        .into())
                    }
                    Ok(Err(_)) => return Err(CliError::StreamClosed.into()),
                    Ok(Ok(sample)) => sample,
                }
            };

            clock.advance(&mut session, subject, sample.timestamp);
            let outcome = session.add_frame(sample)?;
            stats.samples_consumed += 1;
            debug!(serial = outcome.serial, state = outcome.state.as_str(), "sample consumed");

            if let Some(done) = outcome.completed {
                stats.record_take(&session, dispatcher.dispatch(done, session.archive()));
                break;
            }
        }

        stream.stop();
        dispatcher.flush().context("Failed to flush sinks")?;

        let snapshot = stream.metrics().snapshot();
        stats.samples_received = snapshot.samples_received;
        stats.samples_dropped = snapshot.samples_dropped;
        stats.observed_rate = session.recorder().observed_rate();
        stats.active_sinks = dispatcher.len();
        stats.duration = started.elapsed();

        Ok((stats, session.into_archive()))
    }
}

/// Offline capture: one take per subject from a seeded generator, no pacing.
pub struct OfflineCapture {
    blueprint: CaptureBlueprint,
    model: Arc<BodyModel>,
    seed: u64,
}

impl OfflineCapture {
    pub fn new(blueprint: CaptureBlueprint, model: Arc<BodyModel>, seed: u64) -> Self {
        Self {
            blueprint,
            model,
            seed,
        }
    }

    /// Record `subjects` back to back on one continuous source clock.
    pub fn run(
        self,
        subjects: &[Subject],
        dispatcher: &mut Dispatcher,
    ) -> Result<(CaptureStats, CaptureSession)> {
        let started = Instant::now();
        let mut session = CaptureSession::new(self.model.clone(), self.blueprint.processing.clone())
            .context("Failed to create capture session")?;
        let mut generator = PoseGenerator::new(
            MockPoseConfig {
                seed: self.seed,
                ..MockPoseConfig::from(&self.blueprint.source)
            },
            rest_pose(&self.model),
        );
        let mut clock = TakeClock::new(&self.blueprint.capture);
        let mut stats = CaptureStats::default();

        for &subject in subjects {
            clock.rewind();
            loop {
                let sample = generator.next_sample();
                stats.samples_received += 1;
                clock.advance(&mut session, subject, sample.timestamp);
                let outcome = session.add_frame(sample)?;
                stats.samples_consumed += 1;

                if let Some(done) = outcome.completed {
                    stats.record_take(&session, dispatcher.dispatch(done, session.archive()));
                    break;
                }
            }
        }

        dispatcher.flush().context("Failed to flush sinks")?;
        stats.observed_rate = session.recorder().observed_rate();
        stats.active_sinks = dispatcher.len();
        stats.duration = started.elapsed();
        Ok((stats, session))
    }
}

/// Rest pose the mock source sways around.
fn rest_pose(model: &BodyModel) -> Vec<nalgebra::Vector3<f64>> {
    let pose = skeleton::kinect_rest_pose();
    if pose.len() == model.joint_count() {
        pose
    } else {
        vec![nalgebra::Vector3::zeros(); model.joint_count()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> CaptureBlueprint {
        let mut bp = CaptureBlueprint::default();
        bp.processing = contracts::ProcessingConfig::with_delay_depth(4);
        bp.capture.lead_in_s = 0.5;
        bp.capture.record_s = 1.0;
        bp.source.frequency_hz = 30.0;
        bp
    }

    fn model() -> Arc<BodyModel> {
        Arc::new(BodyModel::kinect_v2().unwrap())
    }

    #[test]
    fn test_offline_two_subjects() {
        let bp = blueprint();
        let mut dispatcher = Dispatcher::new(vec![Box::new(exporter::LogSink::new("log"))]);
        let (stats, session) = OfflineCapture::new(bp, model(), 3)
            .run(&[Subject::Athlete, Subject::Trainer], &mut dispatcher)
            .unwrap();

        assert_eq!(stats.metrics.total_takes, 2);
        assert_eq!(stats.sinks_written, 2);
        assert!(stats.failed_sinks.is_empty());
        for subject in Subject::ALL {
            let motions = session.archive().subject(subject);
            assert!(!motions.adjusted.is_empty(), "{subject} has no adjusted frames");
            assert_eq!(motions.raw.first().map(|f| f.serial), Some(0));
        }
    }

    #[test]
    fn test_take_clock_toggles_on_source_time() {
        let bp = blueprint();
        let mut session = CaptureSession::new(model(), bp.processing.clone()).unwrap();
        let mut clock = TakeClock::new(&bp.capture);

        clock.advance(&mut session, Subject::Trainer, 10.0);
        assert_eq!(session.recorder().state(), RecorderState::Idle);
        clock.advance(&mut session, Subject::Trainer, 10.5);
        assert!(session.recorder().is_recording());
        assert_eq!(session.subject(), Subject::Trainer);
        clock.advance(&mut session, Subject::Trainer, 11.2);
        assert!(session.recorder().is_recording());
        clock.advance(&mut session, Subject::Trainer, 11.5);
        assert!(matches!(
            session.recorder().state(),
            RecorderState::Finalizing { .. }
        ));
    }

    #[tokio::test]
    async fn test_live_capture_interrupted() {
        let mut bp = blueprint();
        bp.capture.lead_in_s = 30.0;
        let mut dispatcher = Dispatcher::new(vec![]);
        let (stats, archive) = CaptureOrchestrator::new(bp, model(), Duration::from_secs(2))
            .run(
                &mut dispatcher,
                tokio::time::sleep(Duration::from_millis(200)),
            )
            .await
            .unwrap();

        assert!(stats.aborted);
        assert_eq!(stats.metrics.total_takes, 0);
        assert!(archive.athlete.is_empty());
    }

    #[tokio::test]
    async fn test_live_capture_completes() {
        let mut bp = blueprint();
        bp.capture.lead_in_s = 0.2;
        bp.capture.record_s = 0.3;
        bp.source.frequency_hz = 100.0;
        let mut dispatcher = Dispatcher::new(vec![]);
        let (stats, archive) = CaptureOrchestrator::new(bp, model(), Duration::from_secs(2))
            .run(&mut dispatcher, std::future::pending())
            .await
            .unwrap();

        assert!(!stats.aborted);
        assert_eq!(stats.metrics.total_takes, 1);
        assert!(stats.samples_received >= stats.samples_consumed);
        assert!(!archive.athlete.raw.is_empty());
    }
}
