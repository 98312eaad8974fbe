//! Time resampling onto a uniform grid.
//!
//! Target `k` sits at `Δt·(k−D)`, so the first recorded frame (time 0) is
//! target `D` and the lead-in/lead-out keep their `D` frames each.

use contracts::{Frame, JointSample, MotionSequence, ProcessingConfig, TrackingState};
use tracing::{debug, instrument};

use crate::diagnostics::{Anomaly, Diagnostics};

/// Absorbs rounding in `t_end / Δt` when `t_end` is an exact grid point.
const GRID_EPSILON: f64 = 1e-9;

/// Slerp tolerance for antipodal orientations.
const SLERP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    step: f64,
    margin: usize,
}

impl Interpolator {
    pub fn new(step: f64, margin: usize) -> Self {
        Self { step, margin }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.interpolation_step, config.delay_depth)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of grid targets for `raw`.
    pub fn target_count(&self, raw: &[Frame]) -> usize {
        if raw.len() < 2 {
            return 0;
        }
        let end_index = raw.len().saturating_sub(1 + self.margin);
        let t_end = raw[end_index].timestamp.max(0.0);
        let steps = (t_end / self.step + GRID_EPSILON).floor() as usize;
        self.margin + steps + 1 + self.margin
    }

    #[instrument(name = "motion_interpolate", skip_all, fields(frames = raw.len()))]
    pub fn interpolate(&self, raw: &[Frame], diagnostics: &mut Diagnostics) -> MotionSequence {
        if raw.len() < 2 {
            diagnostics.report(Anomaly::InsufficientFrames { frames: raw.len() });
            return MotionSequence::new();
        }

        for (index, pair) in raw.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                diagnostics.report(Anomaly::NonIncreasingTimestamp {
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }

        let count = self.target_count(raw);
        let last = raw.len() - 1;
        let mut out = MotionSequence::with_capacity(count);
        let mut cursor = 1;

        for k in 0..count {
            let offset = k as i64 - self.margin as i64;
            let t = self.step * offset as f64;

            while cursor < raw.len() && raw[cursor].timestamp <= t {
                cursor += 1;
            }
            let upper = cursor.min(last);
            let prev = &raw[upper - 1];
            let next = &raw[upper];

            let interval = next.timestamp - prev.timestamp;
            let p = if interval > 0.0 {
                (t - prev.timestamp) / interval
            } else {
                diagnostics.report(Anomaly::ZeroInterval {
                    target: k,
                    timestamp: t,
                });
                0.0
            };

            out.push(blend(prev, next, p, offset as i32, t));
        }

        debug!(targets = out.len(), step = self.step, "interpolated");
        out
    }
}

/// Frame between `prev` and `next` at fraction `p`; positions extrapolate,
/// orientations stay within the arc.
fn blend(prev: &Frame, next: &Frame, p: f64, serial: i32, timestamp: f64) -> Frame {
    let clamped = p.clamp(0.0, 1.0);
    let joints = prev
        .joints
        .iter()
        .zip(&next.joints)
        .map(|(a, b)| {
            let position = a.position.lerp(&b.position, p);
            let orientation = a
                .orientation
                .try_slerp(&b.orientation, clamped, SLERP_EPSILON)
                .unwrap_or(a.orientation);
            let tracking_state = if a.tracking_state == TrackingState::Inferred
                || b.tracking_state == TrackingState::Inferred
            {
                TrackingState::Inferred
            } else {
                TrackingState::Tracked
            };
            JointSample::new(position, orientation, tracking_state)
        })
        .collect();

    Frame::new(serial, timestamp, joints)
}
