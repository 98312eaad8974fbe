//! 运动处理指标收集模块
//!
//! 记录录制、处理与输出阶段的运行指标，并在内存中聚合以便输出摘要。

use std::collections::BTreeMap;

use contracts::{MotionStage, ProcessingMeta};
use metrics::{counter, gauge, histogram};

/// 从 ProcessingMeta 记录指标
///
/// 每次处理完一段录制时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_pipeline_metrics;
///
/// let processed = pipeline.process(&raw);
/// record_pipeline_metrics(&processed.meta);
/// ```
pub fn record_pipeline_metrics(meta: &ProcessingMeta) {
    let subject = meta.subject.as_str();

    counter!("kinetrace_takes_processed_total", "subject" => subject).increment(1);

    for (stage, size) in &meta.stage_sizes {
        gauge!(
            "kinetrace_stage_frames",
            "subject" => subject,
            "stage" => stage.as_str()
        )
        .set(*size as f64);
    }

    gauge!("kinetrace_limb_gap_average", "phase" => "before").set(meta.gap_average_before);
    gauge!("kinetrace_limb_gap_average", "phase" => "after").set(meta.gap_average_after);

    histogram!("kinetrace_recording_duration_seconds").record(meta.duration_s);
    histogram!("kinetrace_pipeline_duration_seconds").record(meta.elapsed_ms / 1000.0);
}

/// 记录录制器接收一帧
pub fn record_frame_added(state: &'static str) {
    counter!("kinetrace_frames_added_total", "state" => state).increment(1);
}

/// 记录录制器状态 (0 = idle, 1 = recording, 2 = finalizing)
pub fn record_recorder_state(code: u8) {
    gauge!("kinetrace_recorder_state").set(code as f64);
}

/// 记录乱序时间戳
pub fn record_out_of_order() {
    counter!("kinetrace_timestamps_out_of_order_total").increment(1);
}

/// 记录姿态数据源样本
pub fn record_sample_received(source_id: &str) {
    counter!(
        "kinetrace_samples_received_total",
        "source" => source_id.to_string()
    )
    .increment(1);
}

/// 记录因通道已满而丢弃的样本
pub fn record_sample_dropped(source_id: &str) {
    counter!(
        "kinetrace_samples_dropped_total",
        "source" => source_id.to_string()
    )
    .increment(1);
}

/// 记录数值异常
pub fn record_anomaly(kind: &'static str) {
    counter!("kinetrace_anomalies_total", "kind" => kind).increment(1);
}

/// 记录 Sink 写入
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "kinetrace_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录单个处理阶段的输出帧数
pub fn record_stage_frames(stage: MotionStage, frames: usize) {
    histogram!("kinetrace_stage_output_frames", "stage" => stage.as_str()).record(frames as f64);
}

/// 处理指标聚合器
///
/// 在内存中聚合多次录制的处理结果，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PipelineMetricsAggregator {
    /// 已处理的录制数
    pub total_takes: u64,

    /// 原始帧总数
    pub total_raw_frames: u64,

    /// 异常总数
    pub total_anomalies: u64,

    /// 各类异常次数
    pub anomaly_counts: BTreeMap<String, u64>,

    /// 录制时长统计 (秒)
    pub duration_stats: RunningStats,

    /// 校正前肢体长度波动
    pub gap_before_stats: RunningStats,

    /// 校正后肢体长度波动
    pub gap_after_stats: RunningStats,

    /// 处理耗时 (毫秒)
    pub elapsed_stats: RunningStats,
}

impl PipelineMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &ProcessingMeta) {
        self.total_takes += 1;
        self.total_raw_frames += meta
            .stage_sizes
            .get(&MotionStage::Raw)
            .copied()
            .unwrap_or(0) as u64;
        self.total_anomalies += meta.anomaly_total();

        for (kind, count) in &meta.anomalies {
            *self.anomaly_counts.entry(kind.clone()).or_insert(0) += count;
        }

        self.duration_stats.push(meta.duration_s);
        self.gap_before_stats.push(meta.gap_average_before);
        self.gap_after_stats.push(meta.gap_average_after);
        self.elapsed_stats.push(meta.elapsed_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_takes: self.total_takes,
            total_raw_frames: self.total_raw_frames,
            total_anomalies: self.total_anomalies,
            duration_s: StatsSummary::from(&self.duration_stats),
            gap_before: StatsSummary::from(&self.gap_before_stats),
            gap_after: StatsSummary::from(&self.gap_after_stats),
            elapsed_ms: StatsSummary::from(&self.elapsed_stats),
            anomaly_counts: self.anomaly_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_takes: u64,
    pub total_raw_frames: u64,
    pub total_anomalies: u64,
    pub duration_s: StatsSummary,
    pub gap_before: StatsSummary,
    pub gap_after: StatsSummary,
    pub elapsed_ms: StatsSummary,
    pub anomaly_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Motion Processing Summary ===")?;
        writeln!(f, "Takes processed: {}", self.total_takes)?;
        writeln!(f, "Raw frames: {}", self.total_raw_frames)?;
        writeln!(f, "Recording duration (s): {}", self.duration_s)?;
        writeln!(f, "Limb gap before: {}", self.gap_before)?;
        writeln!(f, "Limb gap after: {}", self.gap_after)?;
        writeln!(f, "Pipeline time (ms): {}", self.elapsed_ms)?;
        writeln!(f, "Anomalies: {}", self.total_anomalies)?;

        for (kind, count) in &self.anomaly_counts {
            writeln!(f, "  {}: {}", kind, count)?;
        }

        Ok(())
    }
}

/// [`RunningStats`] 的打印快照
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        let (min, max) = stats.range().unwrap_or_default();
        Self {
            count: stats.count(),
            min,
            max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.count {
            0 => write!(f, "-"),
            1 => write!(f, "{:.4}", self.mean),
            n => write!(
                f,
                "{:.4} ± {:.4} in [{:.4}, {:.4}] over {n} takes",
                self.mean, self.std_dev, self.min, self.max
            ),
        }
    }
}

/// 在线均值/方差 (Welford) 与取值范围
///
/// 用于录制摘要与录制器的帧间隔统计。非有限值会被跳过，
/// 单个异常时间戳不会污染采集帧率。
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    range: Option<(f64, f64)>,
}

impl RunningStats {
    /// 值被跳过时返回 `false`
    pub fn push(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.range = Some(match self.range {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
        true
    }

    /// 合并另一个累加器 (Chan 成对更新公式)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.m2 += other.m2 + delta * delta * (self.count * other.count) as f64 / total as f64;
        self.mean += delta * other.count as f64 / total as f64;
        self.count = total;
        if let (Some((lo, hi)), Some((olo, ohi))) = (self.range, other.range) {
            self.range = Some((lo.min(olo), hi.max(ohi)));
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 为空时为 0
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 样本方差，少于两个样本时为 0
    pub fn variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Subject;

    #[test]
    fn test_running_stats_frame_intervals() {
        let mut stats = RunningStats::default();
        for interval in [0.032, 0.034, 0.033, 0.035, 0.031] {
            assert!(stats.push(interval));
        }
        assert!(!stats.push(f64::NAN));
        assert!(!stats.push(f64::INFINITY));

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 0.033).abs() < 1e-12);
        assert!((stats.variance() - 2.5e-6).abs() < 1e-12);
        assert_eq!(stats.range(), Some((0.031, 0.035)));
    }

    #[test]
    fn test_running_stats_empty() {
        let stats = RunningStats::default();
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.variance(), 0.0);
        assert_eq!(stats.range(), None);
        assert_eq!(StatsSummary::from(&stats).to_string(), "-");
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 9.0];
        let mut whole = RunningStats::default();
        let mut left = RunningStats::default();
        let mut right = RunningStats::default();
        for (i, v) in values.iter().enumerate() {
            whole.push(*v);
            if i < 2 { left.push(*v) } else { right.push(*v) };
        }

        left.merge(&right);
        assert_eq!(left.count(), whole.count());
        assert!((left.mean() - whole.mean()).abs() < 1e-12);
        assert!((left.variance() - whole.variance()).abs() < 1e-12);
        assert_eq!(left.range(), Some((1.0, 9.0)));

        let mut empty = RunningStats::default();
        empty.merge(&whole);
        assert_eq!(empty.count(), 6);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = PipelineMetricsAggregator::new();

        let meta = ProcessingMeta {
            subject: Subject::Trainer,
            stage_sizes: BTreeMap::from([(MotionStage::Raw, 90), (MotionStage::Adjusted, 66)]),
            anomalies: BTreeMap::from([("zero_interval".to_string(), 2)]),
            gap_average_before: 0.03,
            gap_average_after: 0.001,
            duration_s: 2.0,
            elapsed_ms: 4.5,
        };

        aggregator.update(&meta);
        aggregator.update(&meta);

        assert_eq!(aggregator.total_takes, 2);
        assert_eq!(aggregator.total_raw_frames, 180);
        assert_eq!(aggregator.total_anomalies, 4);
        assert_eq!(aggregator.anomaly_counts.get("zero_interval"), Some(&4));
        assert!((aggregator.duration_stats.mean() - 2.0).abs() < 1e-12);

        aggregator.reset();
        assert_eq!(aggregator.total_takes, 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = MetricsSummary {
            total_takes: 3,
            total_raw_frames: 270,
            total_anomalies: 1,
            duration_s: StatsSummary {
                count: 3,
                min: 2.0,
                max: 3.0,
                mean: 2.5,
                std_dev: 0.5,
            },
            anomaly_counts: BTreeMap::from([("degenerate_limb".to_string(), 1)]),
            ..Default::default()
        };

        let output = format!("{}", summary);
        assert!(output.contains("Takes processed: 3"));
        assert!(output.contains("2.5000 ± 0.5000 in [2.0000, 3.0000] over 3 takes"));
        assert!(output.contains("degenerate_limb: 1"));
        assert!(output.contains("Limb gap before: -"));
    }
}
