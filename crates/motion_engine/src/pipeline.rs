//! Batch processing of one raw take.
//!
//! interpolate → filter → adjust → orientations → crop → offsets

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use contracts::{
    Frame, LimbReport, MotionSequence, MotionStage, PoseOffsets, ProcessingConfig,
    ProcessingMeta, Subject, SubjectMotions,
};
use skeleton::BodyModel;
use tracing::{info, instrument};

use crate::adjust::Adjuster;
use crate::crop::crop;
use crate::diagnostics::Diagnostics;
use crate::error::{MotionError, Result};
use crate::filter::{Filter, SmoothingKernel};
use crate::interpolate::Interpolator;
use crate::offsets::calculate_offsets;
use crate::orientation::calculate_orientations;

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct ProcessedMotion {
    pub motions: SubjectMotions,
    pub limbs_before: LimbReport,
    pub limbs_after: LimbReport,
    pub offsets: Option<PoseOffsets>,
    pub diagnostics: Diagnostics,
    pub meta: ProcessingMeta,
}

#[derive(Debug, Clone)]
pub struct MotionPipeline {
    model: Arc<BodyModel>,
    config: ProcessingConfig,
    interpolator: Interpolator,
    filter: Filter,
}

impl MotionPipeline {
    pub fn new(model: Arc<BodyModel>, config: ProcessingConfig) -> Self {
        let kernel = SmoothingKernel::savitzky_golay_cubic(config.delay_depth);
        Self::with_kernel(model, config, kernel)
    }

    /// Pipeline with a custom smoothing kernel; its half width replaces the
    /// configured delay depth for filtering only.
    pub fn with_kernel(model: Arc<BodyModel>, config: ProcessingConfig, kernel: SmoothingKernel) -> Self {
        Self {
            interpolator: Interpolator::from_config(&config),
            filter: Filter::new(kernel),
            model,
            config,
        }
    }

    pub fn model(&self) -> &Arc<BodyModel> {
        &self.model
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// # Errors
    /// Fails when a frame does not carry one sample per body-model joint.
    pub fn process(&self, subject: Subject, raw: MotionSequence) -> Result<ProcessedMotion> {
        self.process_with(subject, raw, Diagnostics::new())
    }

    /// Like [`process`](Self::process), continuing an existing anomaly log.
    #[instrument(
        name = "motion_pipeline_process",
        skip(self, raw, diagnostics),
        fields(subject = %subject, frames = raw.len())
    )]
    pub fn process_with(
        &self,
        subject: Subject,
        raw: MotionSequence,
        mut diagnostics: Diagnostics,
    ) -> Result<ProcessedMotion> {
        self.check_joint_count(&raw)?;
        let started = Instant::now();
        let depth = self.config.delay_depth;

        let mut interpolated = self.interpolator.interpolate(&raw, &mut diagnostics);
        let mut filtered = self.filter.filter(&interpolated);
        let adjustment = Adjuster::new(&self.model, &self.config).adjust(&filtered, &mut diagnostics);
        let mut adjusted = adjustment.sequence;

        calculate_orientations(&self.model, &mut interpolated, &mut diagnostics);
        calculate_orientations(&self.model, &mut filtered, &mut diagnostics);
        calculate_orientations(&self.model, &mut adjusted, &mut diagnostics);

        let mut raw = raw;
        crop(&mut raw, depth);
        crop(&mut interpolated, depth);

        let offsets = calculate_offsets(&self.model, &adjusted);

        let motions = SubjectMotions {
            raw,
            interpolated,
            filtered,
            adjusted,
        };

        let stage_sizes: BTreeMap<MotionStage, usize> = MotionStage::ALL
            .iter()
            .map(|stage| (*stage, motions.stage(*stage).len()))
            .collect();
        for (stage, size) in &stage_sizes {
            observability::record_stage_frames(*stage, *size);
        }

        let meta = ProcessingMeta {
            subject,
            stage_sizes,
            anomalies: diagnostics.counts(),
            gap_average_before: adjustment.before.gap_average,
            gap_average_after: adjustment.after.gap_average,
            duration_s: motions.adjusted.duration(),
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        observability::record_pipeline_metrics(&meta);

        info!(
            raw = meta.stage_sizes.get(&MotionStage::Raw).copied().unwrap_or(0),
            adjusted = motions.adjusted.len(),
            anomalies = diagnostics.len(),
            gap_before = meta.gap_average_before,
            gap_after = meta.gap_average_after,
            elapsed_ms = meta.elapsed_ms,
            "take processed"
        );

        Ok(ProcessedMotion {
            motions,
            limbs_before: adjustment.before,
            limbs_after: adjustment.after,
            offsets,
            diagnostics,
            meta,
        })
    }

    fn check_joint_count(&self, frames: &[Frame]) -> Result<()> {
        let expected = self.model.joint_count();
        match frames.iter().find(|f| f.joints.len() != expected) {
            Some(frame) => Err(MotionError::JointCount {
                serial: frame.serial,
                expected,
                actual: frame.joints.len(),
            }),
            None => Ok(()),
        }
    }
}
