//! 在线状态Repository实现
//!
//! 持久存储是状态的权威来源：upsert 按 user_id 幂等写入，
//! 记录永不硬删除。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    DomainResult, PresenceRecord, PresenceStatus, repositories::PresenceRepository,
};
use sqlx::{query_as, FromRow};
use uuid::Uuid;

use crate::db::DbPool;
use crate::repository::{invalid_data, map_sqlx_err};

/// 数据库状态记录模型
#[derive(Debug, Clone, FromRow)]
struct DbPresence {
    user_id: Uuid,
    status: String,
    last_seen_at: DateTime<Utc>,
}

impl TryFrom<DbPresence> for PresenceRecord {
    type Error = domain::DomainError;

    fn try_from(value: DbPresence) -> Result<Self, Self::Error> {
        let status: PresenceStatus = value
            .status
            .parse()
            .map_err(|_| invalid_data(format!("invalid presence status: {}", value.status)))?;

        Ok(PresenceRecord::new(
            value.user_id,
            status,
            value.last_seen_at,
        ))
    }
}

/// 在线状态Repository实现
pub struct PgPresenceRepository {
    pool: DbPool,
}

impl PgPresenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceRepository for PgPresenceRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        status: PresenceStatus,
        last_seen_at: DateTime<Utc>,
    ) -> DomainResult<PresenceRecord> {
        let record = query_as::<_, DbPresence>(
            r#"
            INSERT INTO presence (user_id, status, last_seen_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
                SET status = EXCLUDED.status,
                    last_seen_at = EXCLUDED.last_seen_at,
                    updated_at = NOW()
            RETURNING user_id, status, last_seen_at
            "#,
        )
        .bind(user_id)
        .bind(status.to_string())
        .bind(last_seen_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.try_into()
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Option<PresenceRecord>> {
        let record = query_as::<_, DbPresence>(
            "SELECT user_id, status, last_seen_at FROM presence WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(TryInto::try_into).transpose()
    }
}
