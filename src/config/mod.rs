//! Launch Configuration
//!
//! 네트워크 식별자, 엔드포인트 디스크립터, 런치 모드 및 기본값 병합

pub mod endpoint;
pub mod launch;

pub use endpoint::{resolve_url, EndpointDescriptor, Transport};
pub use launch::{
    derive_network_version, LaunchConfig, LaunchMode, LaunchOptions, NetworkIdentifier,
};
