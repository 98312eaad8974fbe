//! Record / finalize state machine with a pre-roll ring buffer.
//!
//! While idle the recorder keeps the most recent `D` samples. A take is the
//! pre-roll, everything captured while recording, and `D` lead-out frames
//! captured after stop; the batch is handed out from the call that supplies the
//! frame following the lead-out.

use contracts::{Frame, JointSample, MotionSequence, ProcessingConfig, TrackingState};
use observability::RunningStats;
use ringbuf::traits::*;
use ringbuf::HeapRb;
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};

/// Recorder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
    /// Collecting lead-out frames
    Finalizing { drained: usize },
}

impl RecorderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Finalizing { .. } => "finalizing",
        }
    }

    fn code(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Recording => 1,
            Self::Finalizing { .. } => 2,
        }
    }
}

/// Result of [`Recorder::add_frame`].
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    /// Serial assigned to the accepted frame
    pub serial: i32,
    /// State after the frame was routed
    pub state: RecorderState,
    /// Completed take, zeroed at the first recorded frame
    pub finalized: Option<MotionSequence>,
}

/// Lifetime counters of one recorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub frames_added: u64,
    pub out_of_order: u64,
    pub takes: u64,
    pub aborted: u64,
    pub pre_roll_padded: u64,
}

pub struct Recorder {
    joint_count: usize,
    delay_depth: usize,
    step: f64,
    state: RecorderState,
    pre_roll: HeapRb<Frame>,
    raw: Vec<Frame>,
    next_serial: i32,
    last_timestamp: Option<f64>,
    intervals: RunningStats,
    stats: RecorderStats,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("joint_count", &self.joint_count)
            .field("delay_depth", &self.delay_depth)
            .field("state", &self.state)
            .field("pre_roll", &self.pre_roll.occupied_len())
            .field("raw", &self.raw.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Recorder {
    /// # Errors
    /// Fails on a zero delay depth or a non-positive interpolation step.
    pub fn new(joint_count: usize, config: &ProcessingConfig) -> Result<Self> {
        if config.delay_depth == 0 {
            return Err(IngestionError::invalid_config(
                "delay_depth",
                "must be at least 1",
            ));
        }
        if !(config.interpolation_step.is_finite() && config.interpolation_step > 0.0) {
            return Err(IngestionError::invalid_config(
                "interpolation_step",
                "must be a positive number of seconds",
            ));
        }

        Ok(Self {
            joint_count,
            delay_depth: config.delay_depth,
            step: config.interpolation_step,
            state: RecorderState::Idle,
            pre_roll: HeapRb::new(config.delay_depth),
            raw: Vec::new(),
            next_serial: 0,
            last_timestamp: None,
            intervals: RunningStats::default(),
            stats: RecorderStats::default(),
        })
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn delay_depth(&self) -> usize {
        self.delay_depth
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn pre_roll_len(&self) -> usize {
        self.pre_roll.occupied_len()
    }

    /// Frames collected for the current take (recording + lead-out so far).
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn stats(&self) -> &RecorderStats {
        &self.stats
    }

    /// Capture rate of the accepted stream in frames per second.
    pub fn observed_rate(&self) -> Option<f64> {
        let mean = self.intervals.mean();
        (self.intervals.count() > 0 && mean > 0.0).then(|| 1.0 / mean)
    }

    /// Idle → Recording → Finalizing. Ignored while finalizing.
    pub fn toggle(&mut self) -> RecorderState {
        match self.state {
            RecorderState::Idle => {
                self.raw.clear();
                self.set_state(RecorderState::Recording);
                info!(pre_roll = self.pre_roll_len(), "recording started");
            }
            RecorderState::Recording => {
                self.set_state(RecorderState::Finalizing { drained: 0 });
                info!(frames = self.raw.len(), "recording stopped, collecting lead-out");
            }
            RecorderState::Finalizing { drained } => {
                warn!(drained, "toggle ignored while finalizing");
            }
        }
        self.state
    }

    /// Drop the current take and the pre-roll; the pipeline never runs.
    pub fn abort(&mut self) {
        let discarded = self.raw.len();
        self.raw.clear();
        self.pre_roll.clear();
        self.next_serial = 0;
        self.last_timestamp = None;
        self.stats.aborted += 1;
        self.set_state(RecorderState::Idle);
        info!(discarded, "recording aborted");
    }

    /// Accept one tracker sample.
    ///
    /// # Errors
    /// Rejects samples whose joint count differs from the body model.
    pub fn add_frame(&mut self, joints: Vec<JointSample>, timestamp: f64) -> Result<RecordedFrame> {
        if joints.len() != self.joint_count {
            return Err(IngestionError::JointCount {
                expected: self.joint_count,
                actual: joints.len(),
            });
        }

        self.track_timestamp(timestamp);
        self.stats.frames_added += 1;
        observability::record_frame_added(self.state.as_str());

        let finalized = match self.state {
            RecorderState::Idle => {
                let frame = self.next_frame(joints, timestamp);
                self.pre_roll.push_overwrite(frame);
                None
            }
            RecorderState::Recording => {
                let frame = self.next_frame(joints, timestamp);
                self.raw.push(frame);
                None
            }
            RecorderState::Finalizing { drained } if drained < self.delay_depth => {
                let frame = self.next_frame(joints, timestamp);
                self.raw.push(frame);
                self.set_state(RecorderState::Finalizing {
                    drained: drained + 1,
                });
                None
            }
            RecorderState::Finalizing { .. } => {
                let take = self.finalize();
                // The triggering frame opens the next take's pre-roll.
                let frame = self.next_frame(joints, timestamp);
                self.pre_roll.push_overwrite(frame);
                Some(take)
            }
        };

        Ok(RecordedFrame {
            serial: self.next_serial - 1,
            state: self.state,
            finalized,
        })
    }

    fn next_frame(&mut self, joints: Vec<JointSample>, timestamp: f64) -> Frame {
        let frame = Frame::new(self.next_serial, timestamp, joints);
        self.next_serial += 1;
        frame
    }

    fn track_timestamp(&mut self, timestamp: f64) {
        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                self.stats.out_of_order += 1;
                observability::record_out_of_order();
                warn!(timestamp, last, "non-increasing tracker timestamp");
            } else {
                self.intervals.push(timestamp - last);
            }
        }
        self.last_timestamp = Some(timestamp);
    }

    fn set_state(&mut self, state: RecorderState) {
        self.state = state;
        observability::record_recorder_state(state.code());
    }

    fn finalize(&mut self) -> MotionSequence {
        let depth = self.delay_depth;
        let mut lead_in: Vec<Frame> = self.pre_roll.pop_iter().collect();

        if lead_in.len() < depth {
            let missing = depth - lead_in.len();
            if let Some(anchor) = lead_in.first().or(self.raw.first()).cloned() {
                let mut padded = self.pad_backwards(&anchor, missing);
                padded.append(&mut lead_in);
                lead_in = padded;
                self.stats.pre_roll_padded += 1;
                warn!(missing, "pre-roll short, lead-in padded with held pose");
            }
        }

        let mut take: Vec<Frame> = lead_in;
        take.append(&mut self.raw);

        // Zero at the first recorded frame; lead-in serials/times go negative.
        if let Some(origin) = take.get(depth).map(|f| (f.serial, f.timestamp)) {
            for frame in &mut take {
                frame.serial -= origin.0;
                frame.timestamp -= origin.1;
            }
        }

        self.stats.takes += 1;
        self.next_serial = 0;
        self.set_state(RecorderState::Idle);

        info!(
            frames = take.len(),
            duration = take.last().map(|f| f.timestamp).unwrap_or(0.0),
            "take finalized"
        );

        MotionSequence::from(take)
    }

    /// `count` copies of `anchor` stepped back in time, oldest first.
    fn pad_backwards(&self, anchor: &Frame, count: usize) -> Vec<Frame> {
        (1..=count)
            .rev()
            .map(|k| {
                let joints = anchor
                    .joints
                    .iter()
                    .map(|j| JointSample {
                        tracking_state: TrackingState::Inferred,
                        ..*j
                    })
                    .collect();
                Frame::new(
                    anchor.serial - k as i32,
                    anchor.timestamp - k as f64 * self.step,
                    joints,
                )
            })
            .inspect(|f| debug!(serial = f.serial, "padding frame"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    const JOINTS: usize = 3;

    fn recorder(depth: usize) -> Recorder {
        Recorder::new(JOINTS, &ProcessingConfig::with_delay_depth(depth)).unwrap()
    }

    fn pose(x: f64) -> Vec<JointSample> {
        (0..JOINTS)
            .map(|i| JointSample::tracked(Vector3::new(x, i as f64, 0.0)))
            .collect()
    }

    fn feed(rec: &mut Recorder, t: f64) -> RecordedFrame {
        rec.add_frame(pose(t), t).unwrap()
    }

    #[test]
    fn test_rejects_bad_config_and_joint_count() {
        assert!(matches!(
            Recorder::new(JOINTS, &ProcessingConfig::with_delay_depth(0)),
            Err(IngestionError::InvalidConfig { .. })
        ));

        let mut rec = recorder(2);
        assert_eq!(
            rec.add_frame(pose(0.0)[..2].to_vec(), 0.0).unwrap_err(),
            IngestionError::JointCount {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(rec.stats().frames_added, 0);
    }

    #[test]
    fn test_idle_keeps_most_recent_frames() {
        let mut rec = recorder(3);
        for i in 0..10 {
            feed(&mut rec, i as f64);
        }
        assert_eq!(rec.pre_roll_len(), 3);
        assert_eq!(rec.raw_len(), 0);
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn test_full_take_with_short_pre_roll() {
        let depth = 4;
        let mut rec = recorder(depth);

        // One idle frame
        feed(&mut rec, 10.0);
        assert_eq!(rec.toggle(), RecorderState::Recording);

        for i in 0..5 {
            feed(&mut rec, 11.0 + i as f64);
        }
        assert!(matches!(rec.toggle(), RecorderState::Finalizing { drained: 0 }));

        for i in 0..depth {
            let out = feed(&mut rec, 16.0 + i as f64);
            assert!(out.finalized.is_none());
        }

        let out = feed(&mut rec, 30.0);
        let take = out.finalized.unwrap();
        assert_eq!(out.state, RecorderState::Idle);
        assert_eq!(out.serial, 0);

        assert_eq!(take.len(), depth + 5 + depth);
        // First recorded frame is the origin
        assert_eq!(take[depth].serial, 0);
        assert_eq!(take[depth].timestamp, 0.0);
        // Lead-in is negative and strictly increasing
        assert!(take[..depth].iter().all(|f| f.serial < 0 && f.timestamp < 0.0));
        assert!(take.is_strictly_increasing());
        assert_eq!(take[depth - 1].timestamp, -1.0);
        // Padding is inferred, the genuine pre-roll frame keeps its state
        assert_eq!(take[0].joints[0].tracking_state, TrackingState::Inferred);
        assert_eq!(
            take[depth - 1].joints[0].tracking_state,
            TrackingState::Tracked
        );
        assert_eq!(rec.stats().pre_roll_padded, 1);
        assert_eq!(rec.stats().takes, 1);

        // Triggering frame seeds the next pre-roll
        assert_eq!(rec.pre_roll_len(), 1);
        assert_eq!(rec.raw_len(), 0);
    }

    #[test]
    fn test_full_pre_roll_needs_no_padding() {
        let depth = 2;
        let mut rec = recorder(depth);
        for i in 0..5 {
            feed(&mut rec, i as f64 * 0.1);
        }
        rec.toggle();
        feed(&mut rec, 0.5);
        rec.toggle();
        feed(&mut rec, 0.6);
        feed(&mut rec, 0.7);
        let take = feed(&mut rec, 0.8).finalized.unwrap();

        assert_eq!(take.len(), 5);
        assert_eq!(rec.stats().pre_roll_padded, 0);
        let serials: Vec<i32> = take.iter().map(|f| f.serial).collect();
        assert_eq!(serials, vec![-2, -1, 0, 1, 2]);
        assert!((take[0].timestamp + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_toggle_ignored_while_finalizing() {
        let mut rec = recorder(2);
        rec.toggle();
        rec.toggle();
        assert!(matches!(rec.toggle(), RecorderState::Finalizing { drained: 0 }));
    }

    #[test]
    fn test_abort_discards_everything() {
        let mut rec = recorder(2);
        feed(&mut rec, 0.0);
        rec.toggle();
        feed(&mut rec, 1.0);
        rec.abort();

        assert_eq!(rec.state(), RecorderState::Idle);
        assert_eq!(rec.raw_len(), 0);
        assert_eq!(rec.pre_roll_len(), 0);
        assert_eq!(feed(&mut rec, 2.0).serial, 0);
        assert_eq!(rec.stats().aborted, 1);
    }

    #[test]
    fn test_abort_while_collecting_lead_out() {
        let depth = 4;
        let mut rec = recorder(depth);
        for i in 0..depth {
            feed(&mut rec, i as f64);
        }
        rec.toggle();
        for i in 0..3 {
            feed(&mut rec, 10.0 + i as f64);
        }
        rec.toggle();
        feed(&mut rec, 13.0);
        feed(&mut rec, 14.0);
        assert_eq!(rec.state(), RecorderState::Finalizing { drained: 2 });

        rec.abort();
        assert_eq!(rec.state(), RecorderState::Idle);
        assert_eq!(rec.raw_len(), 0);
        assert_eq!(rec.pre_roll_len(), 0);

        // No stale take surfaces once the lead-out would have completed
        for i in 0..=depth {
            let out = feed(&mut rec, 20.0 + i as f64);
            assert!(out.finalized.is_none());
            assert_eq!(out.state, RecorderState::Idle);
        }
        assert_eq!(rec.stats().takes, 0);
        assert_eq!(rec.stats().aborted, 1);
    }

    #[test]
    fn test_out_of_order_is_counted_and_accepted() {
        let mut rec = recorder(2);
        feed(&mut rec, 1.0);
        feed(&mut rec, 0.5);
        feed(&mut rec, 0.5);
        assert_eq!(rec.stats().out_of_order, 2);
        assert_eq!(rec.stats().frames_added, 3);
    }

    #[test]
    fn test_observed_rate() {
        let mut rec = recorder(2);
        assert_eq!(rec.observed_rate(), None);
        for i in 0..31 {
            feed(&mut rec, i as f64 / 30.0);
        }
        assert!((rec.observed_rate().unwrap() - 30.0).abs() < 1e-6);
    }
}
