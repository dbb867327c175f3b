//! 通知服务
//!
//! 物化后通知记录的读取与维护：列表、已读转换、删除。
//! 写入口仅供物化器使用（单写者）。

use std::sync::Arc;

use domain::{
    DomainError, Notification, NotificationData, NotificationType, PaginatedResult, Pagination,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApplicationError, repository::NotificationRepository};

/// 通知列表响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub data: Vec<Notification>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub unread_count: u64,
}

pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// 创建通知（物化器专用写入口）
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        data: Option<NotificationData>,
    ) -> Result<Notification, ApplicationError> {
        let notification = Notification::new(user_id, notification_type, title, message, data);
        let created = self.repository.create(&notification).await?;

        info!(
            user_id = %user_id,
            notification_type = %notification_type,
            "已创建通知"
        );

        Ok(created)
    }

    /// 获取用户通知列表，按创建时间倒序
    pub async fn get_notifications(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        unread_only: bool,
    ) -> Result<NotificationPage, ApplicationError> {
        let PaginatedResult {
            data,
            total,
            page,
            total_pages,
        } = self
            .repository
            .find_by_user(user_id, pagination, unread_only)
            .await?;

        let unread_count = if unread_only {
            total
        } else {
            self.repository.count_unread(user_id).await?
        };

        Ok(NotificationPage {
            data,
            total,
            page,
            total_pages,
            unread_count,
        })
    }

    /// 标记通知为已读；通知不存在时返回资源不存在错误
    pub async fn mark_as_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, ApplicationError> {
        self.repository
            .mark_as_read(notification_id, user_id)
            .await?
            .ok_or_else(|| {
                DomainError::resource_not_found("notification", notification_id.to_string()).into()
            })
    }

    /// 标记用户所有未读通知为已读
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> Result<u64, ApplicationError> {
        let count = self.repository.mark_all_as_read(user_id).await?;
        info!(user_id = %user_id, count = count, "已批量标记通知为已读");
        Ok(count)
    }

    /// 获取未读通知数量
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, ApplicationError> {
        Ok(self.repository.count_unread(user_id).await?)
    }

    /// 删除通知；通知不存在时返回资源不存在错误
    pub async fn delete_notification(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ApplicationError> {
        let deleted = self.repository.delete(notification_id, user_id).await?;
        if !deleted {
            return Err(
                DomainError::resource_not_found("notification", notification_id.to_string()).into(),
            );
        }
        Ok(())
    }
}
