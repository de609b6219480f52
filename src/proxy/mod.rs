//! HTTP 客户端构建
//!
//! 统一创建访问远端服务所用的 reqwest 客户端，处理代理与超时配置。

pub mod client_factory;

pub use client_factory::{HttpClientFactory, ProxyError, ProxyProtocol};
