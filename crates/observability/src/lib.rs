//! # Observability
//!
//! 日志与指标的统一入口。
//!
//! - `tracing` 订阅器：JSON / Pretty / Compact 三种输出，`RUST_LOG` 优先
//! - Prometheus 导出器：可选，按端口开启
//! - 录制、处理、导出各阶段的指标记录函数 (见 [`metrics`])
//!
//! ```ignore
//! let config = observability::ObservabilityConfig::from_verbosity(1, false)
//!     .with_format(observability::LogFormat::Compact);
//! observability::init_with_config(config)?;
//!
//! let processed = pipeline.process(subject, &raw)?;
//! observability::record_pipeline_metrics(&processed.meta);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_anomaly, record_frame_added, record_out_of_order, record_pipeline_metrics,
    record_recorder_state, record_sample_dropped, record_sample_received, record_sink_write,
    record_stage_frames, MetricsSummary, PipelineMetricsAggregator, RunningStats, StatsSummary,
};

/// [`init`] 使用的 Prometheus 端口
pub const DEFAULT_METRICS_PORT: u16 = 9464;

/// 默认初始化：JSON 日志、`info` 级别、默认端口上的 Prometheus
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig {
        metrics_port: Some(DEFAULT_METRICS_PORT),
        ..ObservabilityConfig::default()
    })
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 不安装导出器)
    pub metrics_port: Option<u16>,
    /// 未设置 `RUST_LOG` 时的默认级别
    pub default_log_level: String,
    /// 忽略 `RUST_LOG`，始终使用默认级别
    pub force_level: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
            force_level: false,
        }
    }
}

impl ObservabilityConfig {
    /// 根据 `-v` 次数与 `--quiet` 选择默认级别。
    ///
    /// `quiet` 强制 `warn`，不受 `RUST_LOG` 影响。
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            default_log_level: level.to_string(),
            force_level: quiet,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    pub fn with_metrics_port(mut self, port: Option<u16>) -> Self {
        self.metrics_port = port;
        self
    }

    fn filter(&self) -> EnvFilter {
        if self.force_level {
            return EnvFilter::new(&self.default_log_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    /// 单行输出，适合终端
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => anyhow::bail!("unknown log format '{other}'"),
        }
    }
}

/// 安装 tracing 订阅器；设置端口时同时安装 Prometheus 导出器。
///
/// 全局订阅器已存在时返回错误。
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        level = %config.default_log_level,
        metrics_port = ?config.metrics_port,
        "observability initialized"
    );
    Ok(())
}

/// 仅安装 Prometheus 导出器，日志已由调用方初始化。
pub fn init_metrics_only(port: u16) -> Result<()> {
    install_prometheus(port)
}

fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus recorder on port {port}"))?;

    tracing::info!(port, "Prometheus metrics endpoint listening");
    Ok(())
}
