//! Temporal smoothing by symmetric convolution.
//!
//! The default kernel is the cubic Savitzky-Golay smoother over `2D+1` taps.
//! Each output frame needs `D` neighbours on both sides, so the lead-in and
//! lead-out are consumed and the output is `2D` frames shorter than the input.

use contracts::{Frame, MotionSequence};
use nalgebra::Vector3;
use tracing::{debug, instrument};

use crate::error::{MotionError, Result};

/// Symmetric convolution weights with their normalization factor.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingKernel {
    weights: Vec<f64>,
    normalization: f64,
}

impl SmoothingKernel {
    /// Cubic/quadratic Savitzky-Golay smoothing weights for `2·half_width+1` taps.
    ///
    /// `c_i = (3m² − 7 − 20i²) / 4`, normalized by `3 / (m(m² − 4))`.
    pub fn savitzky_golay_cubic(half_width: usize) -> Self {
        let m = (2 * half_width + 1) as f64;
        let weights = (0..2 * half_width + 1)
            .map(|k| {
                let i = k as f64 - half_width as f64;
                (3.0 * m * m - 7.0 - 20.0 * i * i) / 4.0
            })
            .collect();
        let normalization = 3.0 / (m * (m * m - 4.0));
        Self {
            weights,
            normalization,
        }
    }

    /// # Errors
    /// Rejects an empty or even-length table, or one that is not symmetric.
    pub fn from_weights(weights: Vec<f64>, normalization: f64) -> Result<Self> {
        if weights.len() % 2 == 0 {
            return Err(MotionError::Kernel(format!(
                "needs an odd number of taps, got {}",
                weights.len()
            )));
        }
        let symmetric = weights
            .iter()
            .zip(weights.iter().rev())
            .all(|(a, b)| a == b);
        if !symmetric {
            return Err(MotionError::Kernel("weights are not symmetric".into()));
        }
        if !normalization.is_finite() {
            return Err(MotionError::Kernel("normalization is not finite".into()));
        }
        Ok(Self {
            weights,
            normalization,
        })
    }

    pub fn half_width(&self) -> usize {
        self.weights.len() / 2
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Sum of the normalized weights; 1 for a smoother that preserves constants.
    pub fn gain(&self) -> f64 {
        self.weights.iter().sum::<f64>() * self.normalization
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    kernel: SmoothingKernel,
}

impl Filter {
    pub fn new(kernel: SmoothingKernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &SmoothingKernel {
        &self.kernel
    }

    /// Smoothed positions for every frame with a full neighbourhood.
    ///
    /// Serial, timestamp, orientation and tracking state come from the centre frame.
    #[instrument(name = "motion_filter", skip_all, fields(frames = frames.len()))]
    pub fn filter(&self, frames: &[Frame]) -> MotionSequence {
        let depth = self.kernel.half_width();
        if frames.len() <= 2 * depth {
            debug!(depth, "too few frames to filter");
            return MotionSequence::new();
        }

        let out: MotionSequence = (depth..frames.len() - depth)
            .map(|i| {
                let window = &frames[i - depth..=i + depth];
                let mut centre = frames[i].clone();
                for (joint_index, joint) in centre.joints.iter_mut().enumerate() {
                    let sum = window
                        .iter()
                        .zip(&self.kernel.weights)
                        .fold(Vector3::zeros(), |acc, (frame, weight)| {
                            acc + frame.joints[joint_index].position * *weight
                        });
                    joint.position = sum * self.kernel.normalization;
                }
                centre
            })
            .collect();

        debug!(frames = out.len(), depth, "filtered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::JointSample;

    #[test]
    fn test_classic_25_point_table() {
        let kernel = SmoothingKernel::savitzky_golay_cubic(12);
        let weights = kernel.weights();
        assert_eq!(weights.len(), 25);
        assert_eq!(weights[0], -253.0);
        assert_eq!(weights[12], 467.0);
        assert_eq!(weights[24], -253.0);
        assert_eq!(weights[11], 462.0);
        assert!((kernel.normalization() - 1.0 / 5175.0).abs() < 1e-15);
        assert!((kernel.gain() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_kernels_preserve_constants() {
        for depth in 1..8 {
            let kernel = SmoothingKernel::savitzky_golay_cubic(depth);
            assert!((kernel.gain() - 1.0).abs() < 1e-12, "depth {depth}");
        }
        // One tap on each side: the cubic fit through three points is exact
        assert_eq!(
            SmoothingKernel::savitzky_golay_cubic(1).weights(),
            &[0.0, 5.0, 0.0]
        );
    }

    #[test]
    fn test_from_weights_validation() {
        assert!(SmoothingKernel::from_weights(vec![1.0, 1.0], 0.5).is_err());
        assert!(SmoothingKernel::from_weights(vec![1.0, 2.0, 3.0], 1.0 / 6.0).is_err());
        let kernel = SmoothingKernel::from_weights(vec![1.0, 2.0, 1.0], 0.25).unwrap();
        assert_eq!(kernel.half_width(), 1);
    }

    fn sequence(len: usize, f: impl Fn(f64) -> f64) -> Vec<Frame> {
        (0..len)
            .map(|i| {
                let x = i as f64;
                Frame::new(
                    i as i32,
                    x * 0.1,
                    vec![JointSample::tracked(Vector3::new(f(x), 1.0, -f(x)))],
                )
            })
            .collect()
    }

    #[test]
    fn test_output_length() {
        let filter = Filter::new(SmoothingKernel::savitzky_golay_cubic(3));
        assert_eq!(filter.filter(&sequence(6, |x| x)).len(), 0);
        assert_eq!(filter.filter(&sequence(7, |x| x)).len(), 1);
        assert_eq!(filter.filter(&sequence(20, |x| x)).len(), 14);
    }

    #[test]
    fn test_cubic_signal_passes_through() {
        let cubic = |x: f64| 0.01 * x * x * x - 0.2 * x * x + x + 3.0;
        let frames = sequence(40, cubic);
        let out = Filter::new(SmoothingKernel::savitzky_golay_cubic(5)).filter(&frames);

        assert_eq!(out.len(), 30);
        for frame in out.iter() {
            let x = frame.serial as f64;
            let p = frame.joints[0].position;
            assert!((p.x - cubic(x)).abs() < 1e-9);
            assert!((p.y - 1.0).abs() < 1e-12);
        }
        // Centre frame metadata is carried over
        assert_eq!(out[0].serial, 5);
        assert!((out[0].timestamp - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_noise_is_reduced() {
        let frames = sequence(60, |x| if (x as i64) % 2 == 0 { 0.01 } else { -0.01 });
        let out = Filter::new(SmoothingKernel::savitzky_golay_cubic(12)).filter(&frames);
        assert!(out.iter().all(|f| f.joints[0].position.x.abs() < 0.002));
    }
}
