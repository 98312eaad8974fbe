//! # Motion Engine
//!
//! Turns a recorded take into the four motion stages (raw, interpolated,
//! filtered, adjusted) against a [`skeleton::BodyModel`].
//!
//! ## Stages
//!
//! ```text
//! raw take (D lead-in + recorded + D lead-out)
//!   → Interpolator   uniform grid, D extra targets on both ends
//!   → Filter         Savitzky-Golay, consumes the lead-in/lead-out
//!   → Adjuster       limb lengths, thumbs, grounding
//!   → orientations   interpolated / filtered / adjusted
//!   → crop           raw and interpolated lose their D margin
//! ```
//!
//! Numeric trouble inside a take (short input, repeated timestamps,
//! collapsed limbs) never aborts processing; it is collected in
//! [`Diagnostics`].

mod adjust;
mod crop;
mod diagnostics;
mod error;
mod filter;
mod interpolate;
mod offsets;
mod orientation;
mod pipeline;
mod session;

pub use adjust::{calculate_limb_lengths, Adjuster, Adjustment};
pub use crop::crop;
pub use diagnostics::{Anomaly, Diagnostics};
pub use error::{MotionError, Result};
pub use filter::{Filter, SmoothingKernel};
pub use interpolate::Interpolator;
pub use offsets::calculate_offsets;
pub use orientation::{calculate_orientations, look_rotation};
pub use pipeline::{MotionPipeline, ProcessedMotion};
pub use session::{CaptureSession, FrameOutcome};
