//! 通知Repository接口定义

use crate::entities::Notification;
use crate::errors::DomainResult;
use crate::repositories::{PaginatedResult, Pagination};
use async_trait::async_trait;
use uuid::Uuid;

/// 通知Repository接口
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// 创建通知
    async fn create(&self, notification: &Notification) -> DomainResult<Notification>;

    /// 获取用户通知列表，按创建时间倒序
    async fn find_by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        unread_only: bool,
    ) -> DomainResult<PaginatedResult<Notification>>;

    /// 标记通知为已读，返回更新后的通知；不存在时返回 None
    async fn mark_as_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<Option<Notification>>;

    /// 标记用户所有未读通知为已读，返回受影响的数量
    async fn mark_all_as_read(&self, user_id: Uuid) -> DomainResult<u64>;

    /// 获取未读通知数量
    async fn count_unread(&self, user_id: Uuid) -> DomainResult<u64>;

    /// 删除通知，返回是否删除了记录
    async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> DomainResult<bool>;
}
