//! Metrics 模块
//!
//! 提供 Prometheus metrics 导出

use std::time::Instant;

use itemrpc_errors::{AppError, AppResult};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tonic::Status;

/// Metrics 记录器
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// 安装全局 Prometheus 记录器（每个进程只能安装一次）
    pub fn install() -> AppResult<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| AppError::internal(format!("Failed to install Prometheus recorder: {e}")))?;

        Ok(Self { handle })
    }

    /// 获取 Prometheus 格式的 metrics
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 记录 gRPC 请求
pub fn record_grpc_request(service: &str, method: &str, status: &str, duration_ms: f64) {
    let labels = [
        ("service", service.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    counter!("grpc_requests_total", &labels).increment(1);
    histogram!("grpc_request_duration_ms", &labels).record(duration_ms);
}

/// 记录存储操作
pub fn record_store_operation(operation: &str, success: bool) {
    let labels = [
        ("operation", operation.to_string()),
        ("success", success.to_string()),
    ];

    counter!("store_operations_total", &labels).increment(1);
}

/// 请求计时器
pub struct RequestTimer {
    start: Instant,
    service: &'static str,
    method: &'static str,
}

impl RequestTimer {
    pub fn new(service: &'static str, method: &'static str) -> Self {
        Self {
            start: Instant::now(),
            service,
            method,
        }
    }

    pub fn finish(self, status: &str) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_grpc_request(self.service, self.method, status, duration);
    }

    /// 按调用结果记录，失败时使用 gRPC 状态码作为标签
    pub fn finish_with<T>(self, result: &Result<T, Status>) {
        match result {
            Ok(_) => self.finish("ok"),
            Err(status) => self.finish(&format!("{:?}", status.code())),
        }
    }
}
