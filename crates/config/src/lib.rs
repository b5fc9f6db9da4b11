//! itemrpc-config - 配置加载库

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use itemrpc_errors::AppError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid server address {0}")]
    Address(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 配置错误发生在启动期，归为致命错误
impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::config(err)
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// TLS 证书配置
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// 服务端证书
    pub cert_path: PathBuf,
    /// 服务端私钥
    pub key_path: PathBuf,
    /// 客户端使用的 CA 证书
    pub ca_path: PathBuf,
    /// 客户端校验的服务端名称
    #[serde(default)]
    pub domain_name: Option<String>,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 关闭配置
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownConfig {
    /// 等待进行中调用结束的最长时间，0 表示不限
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Option<Duration> {
        match self.drain_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn default_drain_timeout_secs() -> u64 {
    30
}

/// 并发限制配置
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
        }
    }
}

fn default_max_concurrent_calls() -> usize {
    1024
}

/// 健康检查配置
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// 未设置时为 gRPC 端口 + 1000
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            port: None,
        }
    }
}

fn default_health_enabled() -> bool {
    true
}

/// 演示客户端配置
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_client_endpoint")]
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_client_endpoint(),
        }
    }
}

fn default_client_endpoint() -> String {
    "https://localhost:50051".to_string()
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub server: ServerConfig,
    pub tls: TlsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 顺序：`{dir}/default.toml` → `{dir}/{APP_ENV}.toml` → `ITEM_` 前缀的环境变量
    /// （层级用 `__` 分隔，如 `ITEM_SERVER__PORT`）。
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("ITEM_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// gRPC 监听地址
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.to_socket_addrs()
            .map_err(|_| ConfigError::Address(raw.clone()))?
            .next()
            .ok_or(ConfigError::Address(raw))
    }

    /// 健康检查端口（默认为 gRPC 端口 + 1000）
    pub fn health_port(&self) -> u16 {
        self.health
            .port
            .unwrap_or_else(|| self.server.port.saturating_add(1000))
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
