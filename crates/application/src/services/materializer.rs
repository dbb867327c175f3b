//! 通知物化器
//!
//! 把消费到的事件流转化为可查询的持久通知记录。
//! 与分发注册表的无重投策略一致：物化失败只记录日志，
//! 永不向消费循环抛出。

use std::sync::Arc;

use async_trait::async_trait;
use domain::{topics, EventPayload, EventRecord, NotificationData, NotificationType};
use tracing::{error, info};

use crate::{
    dispatch::{EventHandler, HandlerRegistry},
    error::ApplicationError,
    services::NotificationService,
};

/// 消息内容预览的最大字符数
const PREVIEW_MAX_CHARS: usize = 100;

/// 通知物化器
///
/// 为相关事件类型注册处理器；注册必须在消费者启动前完成。
pub struct NotificationMaterializer {
    notifications: Arc<NotificationService>,
}

impl NotificationMaterializer {
    pub fn new(notifications: Arc<NotificationService>) -> Self {
        Self { notifications }
    }

    /// 把全部处理器注册到分发注册表
    pub fn register_handlers(&self, registry: &mut HandlerRegistry) {
        registry.register(
            topics::MESSAGE_CREATED,
            Arc::new(MessageCreatedHandler {
                notifications: self.notifications.clone(),
            }),
        );
        registry.register(topics::MESSAGE_UPDATED, Arc::new(MessageUpdatedHandler));
        registry.register(topics::PRESENCE_UPDATED, Arc::new(PresenceUpdatedHandler));

        info!("通知物化器处理器已注册");
    }
}

/// 截取消息内容预览，按字符边界截断
fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_MAX_CHARS).collect()
}

struct MessageCreatedHandler {
    notifications: Arc<NotificationService>,
}

#[async_trait]
impl EventHandler for MessageCreatedHandler {
    async fn handle(&self, record: &EventRecord) -> Result<(), ApplicationError> {
        let EventPayload::MessageCreated {
            message_id,
            content,
            sender_id,
            receiver_id,
            conversation_id,
            ..
        } = &record.payload
        else {
            error!(event_id = %record.event_id, "载荷与 message.created 不匹配，跳过");
            return Ok(());
        };

        let result = self
            .notifications
            .create_notification(
                *receiver_id,
                NotificationType::NewMessage,
                "New Message",
                "You have a new message",
                Some(NotificationData::NewMessage {
                    message_id: *message_id,
                    sender_id: *sender_id,
                    conversation_id: *conversation_id,
                    preview: preview(content),
                }),
            )
            .await;

        match result {
            Ok(_) => {
                info!(receiver_id = %receiver_id, "已为新消息创建通知");
            }
            Err(e) => {
                // 物化失败不重投，消息丢失是已接受的取舍
                error!(receiver_id = %receiver_id, error = %e, "处理 message.created 事件失败");
            }
        }

        Ok(())
    }
}

struct MessageUpdatedHandler;

#[async_trait]
impl EventHandler for MessageUpdatedHandler {
    async fn handle(&self, record: &EventRecord) -> Result<(), ApplicationError> {
        if let EventPayload::MessageUpdated {
            message_id,
            read_at: Some(_),
            ..
        } = &record.payload
        {
            // 已读回执暂不生成通知，只记录
            info!(message_id = %message_id, "消息已被阅读");
        }
        Ok(())
    }
}

struct PresenceUpdatedHandler;

#[async_trait]
impl EventHandler for PresenceUpdatedHandler {
    async fn handle(&self, record: &EventRecord) -> Result<(), ApplicationError> {
        if let EventPayload::PresenceUpdated {
            user_id, status, ..
        } = &record.payload
        {
            // 预留扩展点：将来可以在这里生成"好友上线"通知
            info!(user_id = %user_id, status = %status, "用户状态已变更");
        }
        Ok(())
    }
}
