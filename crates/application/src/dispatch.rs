//! 事件分发注册表
//!
//! `eventType -> 处理器` 的映射在启动时一次性构建，运行期间只读。
//! 处理器抛出的错误被吞掉并记录日志：消费者永远向前推进，
//! 不重投、不进死信队列，处理失败即消息丢失（已知取舍）。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::EventRecord;
use tracing::{debug, error, warn};

use crate::error::ApplicationError;

/// 事件处理器 trait
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理一条已消费的事件记录
    async fn handle(&self, record: &EventRecord) -> Result<(), ApplicationError>;
}

/// 事件分发注册表
///
/// 注册必须在消费者启动前完成；启动后注册不受支持。
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册事件类型对应的处理器，同类型重复注册以最后一次为准
    pub fn register(&mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_type = event_type.into();
        debug!(event_type = %event_type, "注册事件处理器");
        self.handlers.insert(event_type, handler);
    }

    /// 已注册的处理器数量
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 分发一条事件记录
    ///
    /// `event_type` 优先取自传输层头部，缺失时由调用方回退到载荷字段。
    /// 未注册的类型记录日志后跳过；处理器错误被吸收，永不向消费循环传播。
    pub async fn dispatch(&self, event_type: &str, record: &EventRecord) {
        let Some(handler) = self.handlers.get(event_type) else {
            warn!(event_type = %event_type, "没有找到对应的事件处理器，跳过");
            return;
        };

        if let Err(e) = handler.handle(record).await {
            error!(
                event_type = %event_type,
                event_id = %record.event_id,
                error = %e,
                "事件处理失败，消息不会重投"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{topics, EventPayload, PresenceStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingHandler {
        invocations: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _record: &EventRecord) -> Result<(), ApplicationError> {
            self.invocations.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                Err(ApplicationError::infrastructure("handler exploded"))
            } else {
                Ok(())
            }
        }
    }

    fn presence_event(user_id: Uuid) -> EventRecord {
        EventRecord::new(EventPayload::PresenceUpdated {
            user_id,
            status: PresenceStatus::Online,
            last_seen_at: Some(chrono::Utc::now()),
        })
    }

    #[tokio::test]
    async fn test_dispatch_invokes_registered_handler() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            topics::PRESENCE_UPDATED,
            Arc::new(CountingHandler {
                invocations: invocations.clone(),
                fail: false,
            }),
        );

        let record = presence_event(Uuid::new_v4());
        registry.dispatch(record.event_type(), &record).await;

        assert_eq!(invocations.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_skipped() {
        let registry = HandlerRegistry::new();
        let record = presence_event(Uuid::new_v4());

        // 不会 panic，也不会返回错误
        registry.dispatch("media.uploaded", &record).await;
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_dispatch() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            topics::PRESENCE_UPDATED,
            Arc::new(CountingHandler {
                invocations: invocations.clone(),
                fail: true,
            }),
        );

        // 第一条处理失败被吸收，第二条依然被分发
        let first = presence_event(Uuid::new_v4());
        let second = presence_event(Uuid::new_v4());
        registry.dispatch(first.event_type(), &first).await;
        registry.dispatch(second.event_type(), &second).await;

        assert_eq!(invocations.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_reregistration_replaces_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut registry = HandlerRegistry::new();
        registry.register(
            topics::PRESENCE_UPDATED,
            Arc::new(CountingHandler {
                invocations: first.clone(),
                fail: false,
            }),
        );
        registry.register(
            topics::PRESENCE_UPDATED,
            Arc::new(CountingHandler {
                invocations: second.clone(),
                fail: false,
            }),
        );
        assert_eq!(registry.len(), 1);

        let record = presence_event(Uuid::new_v4());
        registry.dispatch(record.event_type(), &record).await;

        assert_eq!(first.load(Ordering::Relaxed), 0);
        assert_eq!(second.load(Ordering::Relaxed), 1);
    }
}
