//! 事件发布抽象
//!
//! 发布是写路径的尽力而为加速器：发布失败由调用方记录日志，
//! 不会使主写路径失败。

use async_trait::async_trait;
use domain::EventRecord;

use crate::error::ApplicationError;

/// 事件发布接口
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 发布一条事件记录到其目标主题
    async fn publish(&self, record: EventRecord) -> Result<(), ApplicationError>;
}

/// 内存实现（用于测试与降级运行）
pub mod memory {
    use super::*;
    use tokio::sync::Mutex;

    /// 捕获所有已发布事件的内存发布器
    #[derive(Default)]
    pub struct MemoryEventPublisher {
        published: Mutex<Vec<EventRecord>>,
    }

    impl MemoryEventPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn published(&self) -> Vec<EventRecord> {
            self.published.lock().await.clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MemoryEventPublisher {
        async fn publish(&self, record: EventRecord) -> Result<(), ApplicationError> {
            self.published.lock().await.push(record);
            Ok(())
        }
    }

    /// 丢弃所有事件的发布器
    ///
    /// broker 启动时不可达的降级模式：服务继续运行，事件不再传播。
    #[derive(Debug, Default)]
    pub struct NoopEventPublisher;

    #[async_trait]
    impl EventPublisher for NoopEventPublisher {
        async fn publish(&self, record: EventRecord) -> Result<(), ApplicationError> {
            tracing::debug!(
                event_type = record.event_type(),
                event_id = %record.event_id,
                "事件总线未连接，事件被丢弃"
            );
            Ok(())
        }
    }
}
