//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::error::Error;
use std::sync::Arc;

use itemrpc_config::AppConfig;
use itemrpc_errors::{AppError, AppResult};
use tonic::service::Routes;
use tracing::{error, info};

use crate::health::{HealthChecker, HealthServer};
use crate::call_metrics::MetricsRecorder;
use crate::runtime::{init_runtime, spawn_signal_listener};
use crate::server::{GrpcServer, ServerOptions};
use crate::shutdown::ShutdownController;
use crate::tls::ServerCredentials;

/// 运行 gRPC 服务
///
/// 这是服务的统一入口点。它负责：
/// 1. 加载配置
/// 2. 初始化运行时（日志）
/// 3. 加载 TLS 凭据（失败即退出，不会开始监听）
/// 4. 启动健康检查 HTTP 服务器
/// 5. 调用用户提供的闭包构建 gRPC 服务集合
/// 6. 启动服务器，收到终止信号后优雅关闭
///
/// # 示例
///
/// ```ignore
/// use itemrpc_bootstrap::run;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run("config", |_config| {
///         Ok(Routes::new(MyServiceServer::new(MyServiceImpl::default())))
///     })
///     .await
/// }
/// ```
pub async fn run<F>(config_dir: &str, routes_builder: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&AppConfig) -> AppResult<Routes>,
{
    // 1. 加载配置
    let config = AppConfig::load(config_dir).map_err(AppError::from)?;

    // 2. 初始化运行时
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    // 3. 加载凭据
    let credentials = ServerCredentials::load(&config.tls.cert_path, &config.tls.key_path)
        .inspect_err(|e| error!(error = %e, "Failed loading certificates"))?;

    // 4. 初始化 Metrics 记录器
    let metrics = Arc::new(MetricsRecorder::install()?);

    // 5. 关闭控制器，进程信号转发到这里
    let shutdown = ShutdownController::new();
    let signal_handle = spawn_signal_listener(shutdown.clone());

    // 6. 启动健康检查 HTTP 服务器
    let health_handle = config.health.enabled.then(|| {
        let health_server = HealthServer::new(
            HealthChecker::new(shutdown.clone()),
            metrics.clone(),
            config.health_port(),
        );
        tokio::spawn(async move {
            if let Err(e) = health_server.serve().await {
                error!("Health server error: {}", e);
            }
        })
    });

    // 7. 构建服务集合并启动
    let addr = config.server_addr().map_err(AppError::from)?;
    let routes = routes_builder(&config)?;

    let server = GrpcServer::new(credentials, ServerOptions::from_config(&config))
        .start(addr, routes, shutdown.clone())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to start gRPC server"))?;

    // 8. 阻塞直到收到终止信号并排空
    let result = server.wait().await;

    // 9. 清理
    signal_handle.abort();
    if let Some(handle) = health_handle {
        handle.abort();
    }

    result?;
    info!("Service stopped");

    Ok(())
}
