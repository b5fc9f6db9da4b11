//! gRPC 服务生命周期管理
//!
//! 绑定监听端口、安装 TLS、在独立任务上运行分发循环，并负责优雅关闭。

use std::net::SocketAddr;
use std::time::Duration;

use itemrpc_config::AppConfig;
use itemrpc_errors::{AppError, AppResult};
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::Routes;
use tonic::transport::Server;
use tower::limit::GlobalConcurrencyLimitLayer;
use tracing::{error, info, warn};

use crate::shutdown::ShutdownController;
use crate::tls::ServerCredentials;

type ServeResult = Result<(), tonic::transport::Error>;

/// 服务器运行参数
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// 全局并发调用上限
    pub max_concurrent_calls: usize,
    /// 关闭时等待进行中调用的最长时间，`None` 表示一直等待
    pub drain_timeout: Option<Duration>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 1024,
            drain_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ServerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_calls: config.limits.max_concurrent_calls,
            drain_timeout: config.shutdown.drain_timeout(),
        }
    }
}

/// gRPC 服务器
///
/// 凭据和参数通过构造函数注入，服务集合在 [`GrpcServer::start`] 时传入。
pub struct GrpcServer {
    credentials: ServerCredentials,
    options: ServerOptions,
}

impl GrpcServer {
    pub fn new(credentials: ServerCredentials, options: ServerOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }

    /// 绑定地址并在后台任务上开始接受调用
    ///
    /// 返回时监听已经就绪；绑定失败不会留下任何监听状态。
    pub async fn start(
        self,
        addr: SocketAddr,
        routes: Routes,
        shutdown: ShutdownController,
    ) -> AppResult<ServerHandle> {
        // 先装好 TLS，再去占端口
        let server = Server::builder()
            .tls_config(self.credentials.tls_config())
            .map_err(|e| AppError::credential_load("server identity", e))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::bind(addr, e))?;
        let local_addr = listener.local_addr().map_err(|e| AppError::bind(addr, e))?;

        let max_calls = self.options.max_concurrent_calls.max(1);
        let mut server = server.layer(GlobalConcurrencyLimitLayer::new(max_calls));
        let router = server.add_routes(routes);

        let signal = shutdown.shutdown_signal();
        let task = tokio::spawn(async move {
            router
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
                .await
        });

        info!(%local_addr, max_concurrent_calls = max_calls, "gRPC server listening");

        Ok(ServerHandle {
            local_addr,
            shutdown,
            drain_timeout: self.options.drain_timeout,
            task,
        })
    }
}

/// 运行中的服务器句柄
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: ShutdownController,
    drain_timeout: Option<Duration>,
    task: JoinHandle<ServeResult>,
}

impl ServerHandle {
    /// 实际监听的地址（绑定端口 0 时可以拿到分配的端口）
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// 发起优雅关闭并等待进行中的调用结束
    pub async fn stop(self) -> AppResult<()> {
        self.shutdown.trigger();
        drain(self.local_addr, self.drain_timeout, self.task).await
    }

    /// 等待外部触发关闭，然后完成排空
    pub async fn wait(self) -> AppResult<()> {
        let Self {
            local_addr,
            shutdown,
            drain_timeout,
            mut task,
        } = self;

        tokio::select! {
            _ = shutdown.cancelled() => {}
            joined = &mut task => {
                // 分发循环在关闭前自行退出
                return finish(local_addr, joined);
            }
        }

        drain(local_addr, drain_timeout, task).await
    }
}

async fn drain(
    local_addr: SocketAddr,
    drain_timeout: Option<Duration>,
    mut task: JoinHandle<ServeResult>,
) -> AppResult<()> {
    info!(%local_addr, "Stopped accepting calls, draining in-flight calls");

    let joined = match drain_timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(%local_addr, timeout_secs = limit.as_secs(), "Drain timed out, aborting remaining calls");
                task.abort();
                return Ok(());
            }
        },
        None => task.await,
    };

    finish(local_addr, joined)
}

fn finish(local_addr: SocketAddr, joined: Result<ServeResult, JoinError>) -> AppResult<()> {
    match joined {
        Ok(Ok(())) => {
            info!(%local_addr, "gRPC server stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(%local_addr, error = %e, "gRPC server failed");
            Err(e.into())
        }
        Err(e) => Err(AppError::internal(format!("server task failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use rcgen::generate_simple_self_signed;

    use super::*;

    fn credentials() -> ServerCredentials {
        let certified = generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        ServerCredentials::from_pem(certified.cert.pem(), certified.key_pair.serialize_pem())
            .expect("generated credentials should load")
    }

    #[tokio::test]
    async fn test_start_and_stop_releases_socket() {
        let server = GrpcServer::new(credentials(), ServerOptions::default());
        let handle = server
            .start(
                "127.0.0.1:0".parse().unwrap(),
                Routes::default(),
                ShutdownController::new(),
            )
            .await
            .expect("server should start");

        let addr = handle.local_addr();
        assert_ne!(addr.port(), 0);
        tokio::net::TcpStream::connect(addr)
            .await
            .expect("listener should accept connections");

        handle.stop().await.expect("server should stop cleanly");

        // 端口已释放，可以再次绑定
        TcpListener::bind(addr).await.expect("socket should be released");
    }

    #[tokio::test]
    async fn test_address_in_use_is_bind_error() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = occupied.local_addr().unwrap();

        let result = GrpcServer::new(credentials(), ServerOptions::default())
            .start(addr, Routes::default(), ShutdownController::new())
            .await;

        match result {
            Err(AppError::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
            Err(other) => panic!("expected bind error, got {other}"),
            Ok(_) => panic!("expected bind error, server started"),
        }
    }

    #[tokio::test]
    async fn test_external_trigger_ends_wait() {
        let shutdown = ShutdownController::new();
        let handle = GrpcServer::new(
            credentials(),
            ServerOptions {
                max_concurrent_calls: 4,
                drain_timeout: Some(Duration::from_secs(5)),
            },
        )
        .start("127.0.0.1:0".parse().unwrap(), Routes::default(), shutdown.clone())
        .await
        .unwrap();

        let waiter = tokio::spawn(handle.wait());
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());

        tokio::time::timeout(Duration::from_secs(10), waiter)
            .await
            .expect("wait should return after trigger")
            .unwrap()
            .expect("drain should succeed");
    }
}
