//! itemrpc-errors - 统一错误处理
//!
//! 单次调用内的错误（校验、存储）只影响该调用；启动期错误（证书、监听）是致命的。

use std::net::SocketAddr;

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Failed to load credentials from {path}: {reason}")]
    CredentialLoad { path: String, reason: String },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn credential_load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::CredentialLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }

    pub fn config(msg: impl ToString) -> Self {
        Self::Config(msg.to_string())
    }

    pub fn transport(msg: impl ToString) -> Self {
        Self::Transport(msg.to_string())
    }

    /// 是否为启动期的致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CredentialLoad { .. } | Self::Bind { .. } | Self::Config(_)
        )
    }

    /// 转换为 gRPC 状态码
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            Self::Validation(_) => tonic::Code::InvalidArgument,
            Self::Internal(_) => tonic::Code::Internal,
            Self::CredentialLoad { .. } => tonic::Code::Internal,
            Self::Bind { .. } => tonic::Code::Internal,
            Self::Config(_) => tonic::Code::Internal,
            Self::Transport(_) => tonic::Code::Unavailable,
        }
    }
}

impl From<AppError> for tonic::Status {
    fn from(err: AppError) -> Self {
        match err {
            // 校验失败时把违反的规则原样交给调用方
            AppError::Validation(msg) => tonic::Status::invalid_argument(msg),
            other => tonic::Status::new(other.grpc_code(), other.to_string()),
        }
    }
}

impl From<tonic::transport::Error> for AppError {
    fn from(err: tonic::transport::Error) -> Self {
        Self::transport(err)
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
