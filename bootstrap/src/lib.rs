//! itemrpc-bootstrap - 统一服务启动骨架
//!
//! 安全通道工厂、服务生命周期管理、优雅关闭和健康检查。

mod call_metrics;
mod health;
mod reflection;
mod runtime;
mod server;
mod shutdown;
mod starter;
mod tls;

pub use call_metrics::*;
pub use health::*;
pub use reflection::*;
pub use runtime::*;
pub use server::*;
pub use shutdown::*;
pub use starter::*;
pub use tls::*;
