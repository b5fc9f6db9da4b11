//! gRPC 反射辅助工具
//!
//! 提供统一的 gRPC 反射服务构建方式。

use itemrpc_errors::{AppError, AppResult};
use tonic_reflection::server::Builder;
use tonic_reflection::server::v1::{ServerReflection, ServerReflectionServer};

/// 构建一个包含指定文件描述符集的反射服务
pub fn build_reflection(
    file_descriptor_sets: Vec<&'static [u8]>,
) -> AppResult<ServerReflectionServer<impl ServerReflection>> {
    let mut builder = Builder::configure();
    for fds in file_descriptor_sets {
        builder = builder.register_encoded_file_descriptor_set(fds);
    }
    builder
        .build_v1()
        .map_err(|e| AppError::internal(format!("Failed to build reflection service: {e}")))
}
