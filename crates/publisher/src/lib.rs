//! # Publisher
//!
//! 消息发布模块。
//!
//! 负责：
//! - 惰性获取并持有单个 broker channel
//! - 发布失败时丢弃 channel，下一次写入重新获取
//! - 幂等、永久的关闭语义
//! - 提供 loopback controller 供测试与演示使用

pub mod loopback;
pub mod metrics;
pub mod translate;
pub mod writer;

pub use contracts::{Channel, Controller, Dispatch, PublishError, WireMessage};
pub use loopback::{LoopbackChannel, LoopbackController, PublishedMessage};
pub use metrics::{MetricsSnapshot, WriterMetrics};
pub use translate::to_wire;
pub use writer::ChannelWriter;
