//! 通知Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    DomainError, DomainResult, Notification, NotificationData, NotificationType, PaginatedResult,
    Pagination, repositories::NotificationRepository,
};
use sqlx::{query, query_as, FromRow, Row};
use uuid::Uuid;

use crate::db::DbPool;
use crate::repository::{invalid_data, map_sqlx_err};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, notification_type, title, message, data, read, read_at, created_at";

/// 数据库通知模型
#[derive(Debug, Clone, FromRow)]
struct DbNotification {
    id: Uuid,
    user_id: Uuid,
    notification_type: String,
    title: String,
    message: String,
    data: Option<sqlx::types::Json<NotificationData>>,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DbNotification> for Notification {
    type Error = DomainError;

    fn try_from(value: DbNotification) -> Result<Self, Self::Error> {
        let notification_type: NotificationType = value.notification_type.parse().map_err(|_| {
            invalid_data(format!(
                "invalid notification type: {}",
                value.notification_type
            ))
        })?;

        Ok(Notification {
            id: value.id,
            user_id: value.user_id,
            notification_type,
            title: value.title,
            message: value.message,
            data: value.data.map(|json| json.0),
            read: value.read,
            read_at: value.read_at,
            created_at: value.created_at,
        })
    }
}

/// 通知Repository实现
pub struct PgNotificationRepository {
    pool: DbPool,
}

impl PgNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &Notification) -> DomainResult<Notification> {
        let result = query_as::<_, DbNotification>(&format!(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, title, message, data, read, read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {NOTIFICATION_COLUMNS}
            "#,
        ))
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.notification_type.to_string())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.data.as_ref().map(|data| sqlx::types::Json(data.clone())))
        .bind(notification.read)
        .bind(notification.read_at)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        result.try_into()
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        unread_only: bool,
    ) -> DomainResult<PaginatedResult<Notification>> {
        let where_clause = if unread_only {
            "WHERE user_id = $1 AND read = false"
        } else {
            "WHERE user_id = $1"
        };

        // 获取总数
        let count_query = format!("SELECT COUNT(*) FROM notifications {}", where_clause);
        let total: i64 = query(&count_query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .get(0);

        // 获取通知，按创建时间倒序
        let data_query = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            {} ORDER BY created_at DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause, pagination.limit, pagination.offset
        );

        let rows: Vec<DbNotification> = query_as(&data_query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let notifications: Vec<Notification> = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;

        Ok(PaginatedResult::new(notifications, total as u64, pagination))
    }

    async fn mark_as_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<Option<Notification>> {
        // 已读的通知保留首次阅读时间，重复标记是幂等操作
        let result = query_as::<_, DbNotification>(&format!(
            r#"
            UPDATE notifications
            SET read = true, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "#,
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        result.map(TryInto::try_into).transpose()
    }

    async fn mark_all_as_read(&self, user_id: Uuid) -> DomainResult<u64> {
        let result = query(
            "UPDATE notifications SET read = true, read_at = NOW() WHERE user_id = $1 AND read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, user_id: Uuid) -> DomainResult<u64> {
        let count: i64 =
            query("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = false")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?
                .get(0);

        Ok(count as u64)
    }

    async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> DomainResult<bool> {
        let result = query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }
}
