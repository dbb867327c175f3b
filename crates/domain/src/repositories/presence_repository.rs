//! 在线状态Repository接口定义

use crate::entities::{PresenceRecord, PresenceStatus};
use crate::errors::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 在线状态Repository接口
///
/// 持久存储是状态的权威来源，每个用户唯一一条记录，按 user_id upsert。
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// 写入或更新用户状态记录
    async fn upsert(
        &self,
        user_id: Uuid,
        status: PresenceStatus,
        last_seen_at: DateTime<Utc>,
    ) -> DomainResult<PresenceRecord>;

    /// 查询用户状态记录
    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Option<PresenceRecord>>;
}
