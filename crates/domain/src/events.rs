//! 事件总线契约定义
//!
//! 定义跨服务共享的事件信封和载荷结构。线上格式为
//! `{eventId, eventType, timestamp, version, data}`，载荷按
//! `eventType` 判别，恢复原始 JSON 契约的类型安全。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::PresenceStatus;

/// 事件契约版本号
pub const EVENT_SCHEMA_VERSION: &str = "1.0";

/// 事件主题名称
///
/// 主题名即服务间契约：任何服务都可以生产或消费任一主题，
/// 载荷结构由 `eventType` 约定，broker 不做校验。
pub mod topics {
    pub const MESSAGE_CREATED: &str = "message.created";
    pub const MESSAGE_UPDATED: &str = "message.updated";
    pub const MESSAGE_DELETED: &str = "message.deleted";
    pub const PRESENCE_UPDATED: &str = "presence.updated";
    pub const USER_REGISTERED: &str = "user.registered";
    pub const NOTIFICATION_CREATED: &str = "notification.created";
}

/// 事件载荷
///
/// 按 `eventType` 判别的联合类型，`data` 携带各变体的具体字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", content = "data")]
pub enum EventPayload {
    /// 消息创建事件
    #[serde(rename = "message.created", rename_all = "camelCase")]
    MessageCreated {
        message_id: Uuid,
        content: String,
        sender_id: Uuid,
        receiver_id: Uuid,
        conversation_id: Uuid,
        created_at: DateTime<Utc>,
    },

    /// 消息更新事件（内容编辑或已读回执）
    #[serde(rename = "message.updated", rename_all = "camelCase")]
    MessageUpdated {
        message_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        read_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    },

    /// 消息删除事件
    #[serde(rename = "message.deleted", rename_all = "camelCase")]
    MessageDeleted {
        message_id: Uuid,
        deleted_at: DateTime<Utc>,
    },

    /// 用户在线状态变更事件
    #[serde(rename = "presence.updated", rename_all = "camelCase")]
    PresenceUpdated {
        user_id: Uuid,
        status: PresenceStatus,
        last_seen_at: Option<DateTime<Utc>>,
    },

    /// 用户注册事件
    #[serde(rename = "user.registered", rename_all = "camelCase")]
    UserRegistered {
        user_id: Uuid,
        email: String,
        username: String,
        created_at: DateTime<Utc>,
    },

    /// 通知创建事件
    #[serde(rename = "notification.created", rename_all = "camelCase")]
    NotificationCreated {
        notification_id: Uuid,
        user_id: Uuid,
        #[serde(rename = "type")]
        notification_type: String,
        title: String,
        message: String,
        created_at: DateTime<Utc>,
    },
}

impl EventPayload {
    /// 获取事件类型名称
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::MessageCreated { .. } => topics::MESSAGE_CREATED,
            EventPayload::MessageUpdated { .. } => topics::MESSAGE_UPDATED,
            EventPayload::MessageDeleted { .. } => topics::MESSAGE_DELETED,
            EventPayload::PresenceUpdated { .. } => topics::PRESENCE_UPDATED,
            EventPayload::UserRegistered { .. } => topics::USER_REGISTERED,
            EventPayload::NotificationCreated { .. } => topics::NOTIFICATION_CREATED,
        }
    }

    /// 获取分区键（实体ID），保证同一实体的事件有序
    pub fn partition_key(&self) -> String {
        match self {
            EventPayload::MessageCreated { message_id, .. }
            | EventPayload::MessageUpdated { message_id, .. }
            | EventPayload::MessageDeleted { message_id, .. } => message_id.to_string(),
            EventPayload::PresenceUpdated { user_id, .. }
            | EventPayload::UserRegistered { user_id, .. }
            | EventPayload::NotificationCreated { user_id, .. } => user_id.to_string(),
        }
    }
}

/// 事件记录
///
/// 发布后不可变；顺序只在同一分区键内保证。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// 全局唯一事件ID，发布时生成
    pub event_id: Uuid,
    /// 事件创建时间
    pub timestamp: DateTime<Utc>,
    /// 契约版本
    pub version: String,
    /// 事件载荷（序列化为 eventType + data 两个字段）
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl EventRecord {
    /// 创建新的事件记录
    pub fn new(payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            version: EVENT_SCHEMA_VERSION.to_string(),
            payload,
        }
    }

    /// 获取事件类型名称
    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    /// 获取目标主题（主题名与事件类型一致）
    pub fn topic(&self) -> &'static str {
        self.payload.event_type()
    }

    /// 获取分区键
    pub fn partition_key(&self) -> String {
        self.payload.partition_key()
    }
}
