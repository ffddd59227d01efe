// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 错误类型 (Error taxonomy)
//!
//! - `SentinelError`: 启动阶段的致命错误
//! - `NotifyError`:   单个告警通道的错误, 只在调用处记录, 不向上传播

use thiserror::Error;

pub type SentinelResult<T> = Result<T, SentinelError>;

#[derive(Debug, Error)]
pub enum SentinelError {
    /// 摄像头无法打开 (重试后仍失败)
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("failed to load detection model: {0}")]
    ModelLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid address {address:?}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("channel closed: {0}")]
    Closed(&'static str),
}

impl NotifyError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn audio(err: impl std::fmt::Display) -> Self {
        Self::Audio(err.to_string())
    }
}
