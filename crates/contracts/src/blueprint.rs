//! CaptureBlueprint - Config Loader 输出
//!
//! 描述一次采集会话的完整配置：处理参数、采集流程、姿态数据源、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ProcessingConfig, Subject};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的采集配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 运动处理参数
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// 采集流程
    #[serde(default)]
    pub capture: CaptureConfig,

    /// 姿态数据源
    #[serde(default)]
    pub source: SourceConfig,

    /// 输出路由配置
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 骨骼模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyModelKind {
    /// Kinect v2, 25 个关节
    #[default]
    KinectV2,
}

/// 采集流程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 被采集者
    #[serde(default)]
    pub subject: Subject,

    /// 骨骼模型
    #[serde(default)]
    pub body_model: BodyModelKind,

    /// 开始录制前的空闲时长 (秒)，用于填满预录缓冲
    #[serde(default = "default_lead_in_s")]
    pub lead_in_s: f64,

    /// 录制时长 (秒)
    #[serde(default = "default_record_s")]
    pub record_s: f64,

    /// 数据源通道容量
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_lead_in_s() -> f64 {
    1.0
}

fn default_record_s() -> f64 {
    3.0
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            subject: Subject::default(),
            body_model: BodyModelKind::default(),
            lead_in_s: default_lead_in_s(),
            record_s: default_record_s(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// 数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 合成的摆动骨骼
    #[default]
    Mock,
}

/// 姿态数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 数据源类型
    #[serde(default)]
    pub kind: SourceKind,

    /// 采样频率 (Hz)，必须 > 0
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,

    /// 帧间隔抖动，占采样周期的比例 [0, 1)
    #[serde(default = "default_timing_jitter")]
    pub timing_jitter: f64,

    /// 摆动幅度 (米)
    #[serde(default = "default_sway_amplitude")]
    pub sway_amplitude: f64,

    /// 位置噪声幅度 (米)
    #[serde(default = "default_position_noise")]
    pub position_noise: f64,
}

fn default_frequency_hz() -> f64 {
    30.0
}

fn default_timing_jitter() -> f64 {
    0.2
}

fn default_sway_amplitude() -> f64 {
    0.05
}

fn default_position_noise() -> f64 {
    0.004
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            frequency_hz: default_frequency_hz(),
            timing_jitter: default_timing_jitter(),
            sway_amplitude: default_sway_amplitude(),
            position_noise: default_position_noise(),
        }
    }
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// 二进制序列存档
    Store,
    /// TRC 标记轨迹文本
    Trc,
    /// 序列日志表
    SequenceLog,
}

impl SinkType {
    /// 必填参数
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Self::Log => &[],
            Self::Store | Self::Trc | Self::SequenceLog => &["path"],
        }
    }
}

impl Default for CaptureBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            processing: ProcessingConfig::default(),
            capture: CaptureConfig::default(),
            source: SourceConfig::default(),
            sinks: vec![SinkConfig {
                name: "log".to_string(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            }],
        }
    }
}
