//! API layer - gRPC service implementations

pub mod conversions;
mod service;

pub use service::ItemServiceImpl;
