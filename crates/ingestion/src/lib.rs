//! # Ingestion
//!
//! Pose sample ingestion and recording.
//!
//! Responsibilities:
//! - Forward samples from a `PoseSource` onto a bounded async-channel
//!   (newest sample dropped when full)
//! - Keep a pre-roll ring buffer while idle and run the record / finalize
//!   state machine that produces raw takes
//! - Provide a mock source for running without a body tracker
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{MockPoseSource, PoseStream, Recorder, StreamConfig};
//!
//! let mut stream = PoseStream::new(Box::new(source), StreamConfig::default());
//! let rx = stream.take_receiver().unwrap();
//! stream.start()?;
//!
//! let mut recorder = Recorder::new(25, &processing)?;
//! while let Ok(sample) = rx.recv().await {
//!     let out = recorder.add_frame(sample.joints, sample.timestamp)?;
//!     if let Some(raw) = out.finalized {
//!         // hand the take to the pipeline
//!     }
//! }
//! ```

mod config;
mod error;
mod mock;
mod recorder;
mod stream;

pub use config::{IngestionMetrics, MetricsSnapshot, StreamConfig};
pub use error::{IngestionError, Result};
pub use mock::{MockPoseConfig, MockPoseSource, PoseGenerator};
pub use recorder::{RecordedFrame, Recorder, RecorderState, RecorderStats};
pub use stream::PoseStream;
