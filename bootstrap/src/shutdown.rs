//! Graceful Shutdown

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::info;

/// Shutdown 控制器
///
/// 可克隆，所有克隆共享同一个取消令牌。只有第一次触发生效。
#[derive(Clone, Debug)]
pub struct ShutdownController {
    token: CancellationToken,
    triggered: Arc<AtomicBool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 触发关闭
    ///
    /// 返回 `true` 表示本次调用发起了关闭；关闭已在进行中时返回 `false`。
    pub fn trigger(&self) -> bool {
        if self.triggered.swap(true, Ordering::SeqCst) {
            info!("Shutdown already in progress, ignoring trigger");
            return false;
        }

        info!("Triggering shutdown");
        self.token.cancel();
        true
    }

    /// 是否已经触发关闭
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 等待关闭信号
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// 创建一个可以移入其他任务的关闭 future
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + use<> {
        let token = self.token.clone();
        async move { token.cancelled().await }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
