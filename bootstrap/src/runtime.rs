//! 服务运行时

use itemrpc_config::AppConfig;
use itemrpc_telemetry::{init_tracing, init_tracing_json};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::shutdown::ShutdownController;

/// 初始化服务运行时
pub fn init_runtime(config: &AppConfig) {
    // 初始化 tracing
    if config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );
}

/// 等待关闭信号（Ctrl+C 或 SIGTERM）
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// 把每一次进程信号转发给关闭控制器
///
/// 第一次信号发起关闭，之后的信号只记录日志。
pub fn spawn_signal_listener(shutdown: ShutdownController) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            shutdown_signal().await;
            shutdown.trigger();
        }
    })
}
