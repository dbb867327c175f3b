//! 在线状态管理器
//!
//! 双存储编排：持久存储是权威来源，TTL 缓存承载热读路径。
//! 没有跨 存储写入 + 缓存写入 + 事件发布 的分布式事务，
//! 这是一条尽力而为、最终一致的流水线。

use std::sync::Arc;

use domain::{EventPayload, EventRecord, PresenceRecord, PresenceStatus};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    cache::PresenceCache, clock::Clock, error::ApplicationError, publisher::EventPublisher,
    repository::PresenceRepository,
};

pub struct PresenceServiceDependencies {
    pub repository: Arc<dyn PresenceRepository>,
    pub cache: Arc<dyn PresenceCache>,
    pub publisher: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
}

/// 在线状态服务
///
/// 已知局限：缓存 TTL 过期不会把持久记录翻转为 OFFLINE——
/// 心跳中断只是缓存层事件。客户端崩溃且未显式下线时，
/// 持久状态会一直保持最后一次显式设置的值。
pub struct PresenceService {
    deps: PresenceServiceDependencies,
}

impl PresenceService {
    pub fn new(deps: PresenceServiceDependencies) -> Self {
        Self { deps }
    }

    /// 更新用户状态
    ///
    /// 持久写入必须成功，否则整个操作失败且不产生任何下游副作用；
    /// 缓存写入和事件发布是尽力而为的加速器，失败只记录日志。
    pub async fn update_presence(
        &self,
        user_id: Uuid,
        status: PresenceStatus,
    ) -> Result<PresenceRecord, ApplicationError> {
        let last_seen_at = self.deps.clock.now();

        // 权威写入在先，失败即中止
        let record = self
            .deps
            .repository
            .upsert(user_id, status, last_seen_at)
            .await?;

        if let Err(e) = self.deps.cache.set(&record).await {
            warn!(user_id = %user_id, error = %e, "缓存写入失败，继续执行");
        }

        let event = EventRecord::new(EventPayload::PresenceUpdated {
            user_id,
            status,
            last_seen_at: record.last_seen_at,
        });
        if let Err(e) = self.deps.publisher.publish(event).await {
            warn!(user_id = %user_id, error = %e, "状态变更事件发布失败，继续执行");
        }

        info!(user_id = %user_id, status = %status, "用户状态已更新");

        Ok(record)
    }

    /// 查询用户状态
    ///
    /// 缓存命中直接返回；未命中回落到持久存储并回填缓存；
    /// 持久存储中也不存在时合成 OFFLINE 占位值，不创建记录。
    pub async fn get_presence(&self, user_id: Uuid) -> Result<PresenceRecord, ApplicationError> {
        match self.deps.cache.get(user_id).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "缓存读取失败，回落到持久存储");
            }
        }

        let Some(record) = self.deps.repository.find_by_user(user_id).await? else {
            return Ok(PresenceRecord::offline(user_id));
        };

        if let Err(e) = self.deps.cache.set(&record).await {
            warn!(user_id = %user_id, error = %e, "缓存回填失败");
        }

        Ok(record)
    }

    /// 批量查询用户状态
    ///
    /// 单次缓存往返；未命中的条目直接合成 OFFLINE，不回落到持久存储。
    /// 这是面向性能的批量路径，用完美一致性换取低延迟。
    /// 结果顺序与输入一致。
    pub async fn get_bulk_presence(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PresenceRecord>, ApplicationError> {
        let cached = match self.deps.cache.get_bulk(user_ids).await {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "批量缓存读取失败，全部合成 OFFLINE");
                vec![None; user_ids.len()]
            }
        };

        Ok(user_ids
            .iter()
            .zip(cached)
            .map(|(user_id, entry)| entry.unwrap_or_else(|| PresenceRecord::offline(*user_id)))
            .collect())
    }

    /// 心跳：仅延长缓存 TTL
    ///
    /// 不触碰持久存储，不发布事件；用户没有缓存条目时也无害。
    pub async fn heartbeat(&self, user_id: Uuid) -> Result<(), ApplicationError> {
        if let Err(e) = self.deps.cache.extend_ttl(user_id).await {
            warn!(user_id = %user_id, error = %e, "心跳延长 TTL 失败");
        }
        Ok(())
    }

    /// 设置用户离线
    pub async fn set_offline(&self, user_id: Uuid) -> Result<PresenceRecord, ApplicationError> {
        self.update_presence(user_id, PresenceStatus::Offline).await
    }
}
