//! item-service - 条目 RPC 服务
//!
//! 在同一条 TLS 通道上提供一元、服务端流、客户端流三种调用。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

// Proto generated code modules
pub mod item {
    pub mod v1 {
        tonic::include_proto!("item.v1");
    }
}

pub use item::v1 as proto;

/// File descriptor set for gRPC reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("item_descriptor");
