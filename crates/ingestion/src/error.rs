//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error, PartialEq)]
pub enum IngestionError {
    /// 样本关节数与骨骼模型不符
    #[error("joint count mismatch: expected {expected}, got {actual}")]
    JointCount {
        /// 骨骼模型关节数
        expected: usize,
        /// 样本关节数
        actual: usize,
    },

    /// 录制参数无效
    #[error("invalid recorder config '{field}': {message}")]
    InvalidConfig {
        /// 字段名
        field: String,
        /// 错误消息
        message: String,
    },

    /// 通道已关闭
    #[error("channel closed for source {source_id}")]
    ChannelClosed {
        /// 数据源 ID
        source_id: String,
    },

    /// 数据源已在监听
    #[error("source {source_id} is already listening")]
    AlreadyListening {
        /// 数据源 ID
        source_id: String,
    },
}

impl IngestionError {
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
