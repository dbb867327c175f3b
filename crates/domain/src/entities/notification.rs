//! 通知实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewMessage,
    MessageRead,
    PresenceUpdate,
    System,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::NewMessage => write!(f, "NEW_MESSAGE"),
            NotificationType::MessageRead => write!(f, "MESSAGE_READ"),
            NotificationType::PresenceUpdate => write!(f, "PRESENCE_UPDATE"),
            NotificationType::System => write!(f, "SYSTEM"),
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = crate::errors::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW_MESSAGE" => Ok(NotificationType::NewMessage),
            "MESSAGE_READ" => Ok(NotificationType::MessageRead),
            "PRESENCE_UPDATE" => Ok(NotificationType::PresenceUpdate),
            "SYSTEM" => Ok(NotificationType::System),
            other => Err(crate::errors::DomainError::validation_error(
                "type",
                format!("unknown notification type: {other}"),
            )),
        }
    }
}

/// 通知附加数据
///
/// 具体形状由通知的 `notification_type` 决定，序列化时不携带额外的标签字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationData {
    /// 新消息通知的附加数据，preview 为消息内容截断预览
    #[serde(rename_all = "camelCase")]
    NewMessage {
        message_id: Uuid,
        sender_id: Uuid,
        conversation_id: Uuid,
        preview: String,
    },
    /// 状态变更通知的附加数据
    #[serde(rename_all = "camelCase")]
    PresenceUpdate {
        user_id: Uuid,
        status: crate::entities::PresenceStatus,
    },
}

/// 通知实体
///
/// 由通知物化器创建，之后只通过已读状态转换修改，
/// 用户显式请求时删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 通知ID
    pub id: Uuid,
    /// 接收者用户ID
    pub user_id: Uuid,
    /// 通知类型
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// 通知标题
    pub title: String,
    /// 通知内容
    pub message: String,
    /// 附加数据
    pub data: Option<NotificationData>,
    /// 是否已读
    pub read: bool,
    /// 阅读时间
    pub read_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 创建新通知
    pub fn new(
        user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        data: Option<NotificationData>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            data,
            read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// 标记为已读，重复标记不改变首次阅读时间
    pub fn mark_as_read(&mut self) {
        if !self.read {
            self.read = true;
            self.read_at = Some(Utc::now());
        }
    }
}
