//! # Exporter
//!
//! 处理结果输出模块。
//!
//! 负责：
//! - 二进制序列存档 (`MotionStore`)
//! - TRC 标记轨迹导出 (`TrcWriter`)
//! - 序列日志 / 肢体长度 / 关节层级文本报告
//! - `MotionSink` 实现与 fan-out，单个 sink 失败不影响其余

pub mod dispatcher;
pub mod error;
pub mod report;
pub mod sinks;
pub mod store;
pub mod trc;

pub use contracts::MotionSink;
pub use dispatcher::{create_sink, DispatchReport, Dispatcher, SinkMetrics};
pub use error::{ExportError, Result};
pub use report::{hierarchy_listing, limb_report, sequence_log};
pub use sinks::{LogSink, PathTemplate, SequenceLogSink, StoreSink, TrcSink};
pub use store::{read_sequence, write_sequence, MotionStore};
pub use trc::TrcWriter;
