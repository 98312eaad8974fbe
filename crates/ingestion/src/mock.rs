//! Mock 姿态数据源
//!
//! 在无体感设备的环境下生成一个原地摆动的骨骼，时间戳带抖动，
//! 关节位置带噪声，便于测试整条处理链路。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contracts::{JointSample, PoseCallback, PoseSample, PoseSource, SourceConfig};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

/// Mock 数据源配置
#[derive(Debug, Clone)]
pub struct MockPoseConfig {
    /// 发送频率 (Hz)
    pub frequency_hz: f64,

    /// 帧间隔抖动，占采样周期的比例 [0, 1)
    pub timing_jitter: f64,

    /// 摆动幅度 (米)
    pub sway_amplitude: f64,

    /// 位置噪声幅度 (米)
    pub position_noise: f64,

    /// 随机种子
    pub seed: u64,
}

impl Default for MockPoseConfig {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for MockPoseConfig {
    fn from(config: &SourceConfig) -> Self {
        Self {
            frequency_hz: config.frequency_hz,
            timing_jitter: config.timing_jitter,
            sway_amplitude: config.sway_amplitude,
            position_noise: config.position_noise,
            seed: 0x6b69_6e65,
        }
    }
}

/// Deterministic pose generator shared by the threaded source and offline callers.
#[derive(Debug, Clone)]
pub struct PoseGenerator {
    config: MockPoseConfig,
    rest_pose: Vec<Vector3<f64>>,
    rng: StdRng,
    clock: f64,
}

impl PoseGenerator {
    pub fn new(config: MockPoseConfig, rest_pose: Vec<Vector3<f64>>) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rest_pose,
            rng,
            clock: 0.0,
        }
    }

    pub fn joint_count(&self) -> usize {
        self.rest_pose.len()
    }

    /// Nominal sampling period in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.config.frequency_hz
    }

    /// Next sample; the clock advances by the jittered period.
    pub fn next_sample(&mut self) -> PoseSample {
        let timestamp = self.clock;
        let sample = self.sample_at(timestamp);

        let jitter = self.config.timing_jitter;
        let scale = if jitter > 0.0 {
            1.0 + self.rng.random_range(-jitter..jitter)
        } else {
            1.0
        };
        self.clock += self.period() * scale;

        sample
    }

    fn sample_at(&mut self, t: f64) -> PoseSample {
        let amplitude = self.config.sway_amplitude;
        let noise = self.config.position_noise;
        let omega = std::f64::consts::TAU * 0.5;
        let sway = Vector3::new(amplitude * (omega * t).sin(), 0.0, 0.0);

        let joints = self
            .rest_pose
            .iter()
            .enumerate()
            .map(|(index, rest)| {
                // Limbs swing out of phase with each other.
                let phase = index as f64 * 0.7;
                let swing = Vector3::new(
                    0.0,
                    0.3 * amplitude * (2.0 * omega * t + phase).cos(),
                    0.5 * amplitude * (2.0 * omega * t + phase).sin(),
                );
                let jitter = if noise > 0.0 {
                    Vector3::new(
                        self.rng.random_range(-noise..noise),
                        self.rng.random_range(-noise..noise),
                        self.rng.random_range(-noise..noise),
                    )
                } else {
                    Vector3::zeros()
                };
                JointSample::tracked(rest + sway + swing + jitter)
            })
            .collect();

        PoseSample::new(joints, t)
    }
}

/// Mock 姿态数据源
///
/// 在后台线程中按设定频率生成样本并通过回调发送，与真实体感 SDK 的行为一致。
pub struct MockPoseSource {
    source_id: String,
    generator: Arc<Mutex<PoseGenerator>>,
    listening: Arc<AtomicBool>,
}

impl MockPoseSource {
    /// 创建新的 Mock 数据源
    pub fn new(
        source_id: impl Into<String>,
        config: MockPoseConfig,
        rest_pose: Vec<Vector3<f64>>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            generator: Arc::new(Mutex::new(PoseGenerator::new(config, rest_pose))),
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl PoseSource for MockPoseSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn joint_count(&self) -> usize {
        self.generator
            .lock()
            .map(|g| g.joint_count())
            .unwrap_or_default()
    }

    fn listen(&self, callback: PoseCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let generator = self.generator.clone();
        let listening = self.listening.clone();

        thread::spawn(move || {
            debug!(source_id = %source_id, "mock pose source started");

            while listening.load(Ordering::Relaxed) {
                let (sample, period) = match generator.lock() {
                    Ok(mut g) => {
                        let sample = g.next_sample();
                        (sample, g.period())
                    }
                    Err(_) => {
                        warn!(source_id = %source_id, "pose generator poisoned");
                        break;
                    }
                };

                let timestamp = sample.timestamp;
                callback(sample);
                trace!(source_id = %source_id, timestamp, "mock pose sent");

                thread::sleep(Duration::from_secs_f64(period));
            }

            listening.store(false, Ordering::SeqCst);
            debug!(source_id = %source_id, "mock pose source stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
