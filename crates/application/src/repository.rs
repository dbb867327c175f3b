//! 仓储接口再导出与内存实现
//!
//! 接口由领域层定义；这里额外提供内存实现，用于测试和无数据库的本地运行。

pub use domain::repositories::{NotificationRepository, PresenceRepository};

pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use domain::{
        DomainError, DomainResult, Notification, PaginatedResult, Pagination, PresenceRecord,
        PresenceStatus,
    };
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use super::{NotificationRepository, PresenceRepository};

    /// 内存实现的在线状态仓储
    ///
    /// 记录读取次数，便于测试验证批量路径不回落到持久存储。
    #[derive(Default)]
    pub struct MemoryPresenceRepository {
        records: RwLock<HashMap<Uuid, PresenceRecord>>,
        find_calls: AtomicUsize,
    }

    impl MemoryPresenceRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// 已执行的查询次数
        pub fn find_calls(&self) -> usize {
            self.find_calls.load(Ordering::Relaxed)
        }

        /// 持久记录数量
        pub async fn len(&self) -> usize {
            self.records.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.records.read().await.is_empty()
        }
    }

    #[async_trait]
    impl PresenceRepository for MemoryPresenceRepository {
        async fn upsert(
            &self,
            user_id: Uuid,
            status: PresenceStatus,
            last_seen_at: DateTime<Utc>,
        ) -> DomainResult<PresenceRecord> {
            let record = PresenceRecord::new(user_id, status, last_seen_at);
            self.records.write().await.insert(user_id, record.clone());
            Ok(record)
        }

        async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Option<PresenceRecord>> {
            self.find_calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.records.read().await.get(&user_id).cloned())
        }
    }

    /// 总是失败的在线状态仓储（用于测试权威存储故障路径）
    #[derive(Default)]
    pub struct FailingPresenceRepository;

    #[async_trait]
    impl PresenceRepository for FailingPresenceRepository {
        async fn upsert(
            &self,
            _user_id: Uuid,
            _status: PresenceStatus,
            _last_seen_at: DateTime<Utc>,
        ) -> DomainResult<PresenceRecord> {
            Err(DomainError::DatabaseError("connection refused".to_string()))
        }

        async fn find_by_user(&self, _user_id: Uuid) -> DomainResult<Option<PresenceRecord>> {
            Err(DomainError::DatabaseError("connection refused".to_string()))
        }
    }

    /// 内存实现的通知仓储
    #[derive(Default)]
    pub struct MemoryNotificationRepository {
        notifications: RwLock<Vec<Notification>>,
    }

    impl MemoryNotificationRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn all(&self) -> Vec<Notification> {
            self.notifications.read().await.clone()
        }
    }

    #[async_trait]
    impl NotificationRepository for MemoryNotificationRepository {
        async fn create(&self, notification: &Notification) -> DomainResult<Notification> {
            self.notifications.write().await.push(notification.clone());
            Ok(notification.clone())
        }

        async fn find_by_user(
            &self,
            user_id: Uuid,
            pagination: Pagination,
            unread_only: bool,
        ) -> DomainResult<PaginatedResult<Notification>> {
            let notifications = self.notifications.read().await;
            let mut matching: Vec<Notification> = notifications
                .iter()
                .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let total = matching.len() as u64;
            let data = matching
                .into_iter()
                .skip(pagination.offset as usize)
                .take(pagination.limit as usize)
                .collect();

            Ok(PaginatedResult::new(data, total, pagination))
        }

        async fn mark_as_read(
            &self,
            notification_id: Uuid,
            user_id: Uuid,
        ) -> DomainResult<Option<Notification>> {
            let mut notifications = self.notifications.write().await;
            let found = notifications
                .iter_mut()
                .find(|n| n.id == notification_id && n.user_id == user_id);

            Ok(found.map(|n| {
                n.mark_as_read();
                n.clone()
            }))
        }

        async fn mark_all_as_read(&self, user_id: Uuid) -> DomainResult<u64> {
            let mut notifications = self.notifications.write().await;
            let mut count = 0;
            for notification in notifications
                .iter_mut()
                .filter(|n| n.user_id == user_id && !n.read)
            {
                notification.mark_as_read();
                count += 1;
            }
            Ok(count)
        }

        async fn count_unread(&self, user_id: Uuid) -> DomainResult<u64> {
            let notifications = self.notifications.read().await;
            Ok(notifications
                .iter()
                .filter(|n| n.user_id == user_id && !n.read)
                .count() as u64)
        }

        async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> DomainResult<bool> {
            let mut notifications = self.notifications.write().await;
            let before = notifications.len();
            notifications.retain(|n| !(n.id == notification_id && n.user_id == user_id));
            Ok(notifications.len() < before)
        }
    }
}
