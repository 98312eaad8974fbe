//! Live capture session: recorder in front, pipeline behind.
//!
//! A session owns one recorder and one archive. Finished takes are processed
//! as soon as the recorder hands them out and stored under the subject that
//! was active when recording started.

use std::sync::Arc;

use contracts::{MotionArchive, PoseSample, ProcessingConfig, Subject};
use ingestion::{Recorder, RecorderState};
use skeleton::BodyModel;
use tracing::{info, instrument, warn};

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::error::Result;
use crate::pipeline::{MotionPipeline, ProcessedMotion};

/// What happened to one sample fed into the session.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub serial: i32,
    pub state: RecorderState,
    /// Subject whose take was completed by this sample
    pub completed: Option<Subject>,
}

#[derive(Debug)]
pub struct CaptureSession {
    recorder: Recorder,
    pipeline: MotionPipeline,
    archive: MotionArchive,
    subject: Subject,
    latest: Option<ProcessedMotion>,
    padded_seen: u64,
}

impl CaptureSession {
    /// # Errors
    /// Fails when the processing config cannot drive a recorder.
    pub fn new(model: Arc<BodyModel>, config: ProcessingConfig) -> Result<Self> {
        let recorder = Recorder::new(model.joint_count(), &config)?;
        Ok(Self {
            recorder,
            pipeline: MotionPipeline::new(model, config),
            archive: MotionArchive::default(),
            subject: Subject::default(),
            latest: None,
            padded_seen: 0,
        })
    }

    /// Start a take for `subject`. `false` unless the recorder was idle.
    pub fn start_recording(&mut self, subject: Subject) -> bool {
        if self.recorder.state() != RecorderState::Idle {
            warn!(state = self.recorder.state().as_str(), "start ignored");
            return false;
        }
        self.subject = subject;
        self.recorder.toggle();
        info!(subject = %subject, "capture started");
        true
    }

    /// Stop the running take; lead-out collection follows. `false` unless recording.
    pub fn stop_recording(&mut self) -> bool {
        if !self.recorder.is_recording() {
            warn!(state = self.recorder.state().as_str(), "stop ignored");
            return false;
        }
        self.recorder.toggle();
        true
    }

    /// Discard the current take without processing it.
    pub fn abort(&mut self) {
        self.recorder.abort();
        self.padded_seen = self.recorder.stats().pre_roll_padded;
    }

    /// Feed one tracker sample.
    ///
    /// # Errors
    /// Fails when the sample or a finished take does not match the body model.
    #[instrument(name = "capture_add_frame", skip_all, fields(t = sample.timestamp))]
    pub fn add_frame(&mut self, sample: PoseSample) -> Result<FrameOutcome> {
        let recorded = self.recorder.add_frame(sample.joints, sample.timestamp)?;

        let completed = match recorded.finalized {
            Some(take) => {
                let mut diagnostics = Diagnostics::new();
                let padded = self.recorder.stats().pre_roll_padded;
                if padded > self.padded_seen {
                    diagnostics.report(Anomaly::PreRollPadded { takes: padded });
                    self.padded_seen = padded;
                }

                let processed = self.pipeline.process_with(self.subject, take, diagnostics)?;
                *self.archive.subject_mut(self.subject) = processed.motions.clone();
                self.latest = Some(processed);
                Some(self.subject)
            }
            None => None,
        };

        Ok(FrameOutcome {
            serial: recorded.serial,
            state: recorded.state,
            completed,
        })
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn archive(&self) -> &MotionArchive {
        &self.archive
    }

    pub fn into_archive(self) -> MotionArchive {
        self.archive
    }

    /// Result of the most recent completed take.
    pub fn latest(&self) -> Option<&ProcessedMotion> {
        self.latest.as_ref()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn pipeline(&self) -> &MotionPipeline {
        &self.pipeline
    }
}
