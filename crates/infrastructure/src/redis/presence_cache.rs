//! Redis实现的在线状态缓存
//!
//! 键为 `presence:{userId}`，值为 JSON 序列化的状态记录，
//! 滑动过期：每次写入和心跳都会刷新 TTL。

use std::sync::Arc;

use application::{ApplicationError, PresenceCache};
use async_trait::async_trait;
use domain::PresenceRecord;
use uuid::Uuid;

/// 缓存 TTL，固定设计常量；影响缓存未命中频率
pub const PRESENCE_TTL_SECONDS: u64 = 300;

pub struct RedisPresenceCache {
    redis_client: Arc<redis::Client>,
}

impl RedisPresenceCache {
    pub fn new(redis_client: Arc<redis::Client>) -> Self {
        Self { redis_client }
    }

    /// 生成用户状态缓存的Redis键
    fn presence_key(&self, user_id: Uuid) -> String {
        format!("presence:{}", user_id)
    }

    /// 获取连接
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, ApplicationError> {
        self.redis_client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                let message = format!("Redis connection failed: {e}");
                ApplicationError::infrastructure(message)
            })
    }

    fn parse_record(value: &str) -> Result<PresenceRecord, ApplicationError> {
        serde_json::from_str(value).map_err(|e| {
            let message = format!("Invalid cached presence record: {e}");
            ApplicationError::infrastructure(message)
        })
    }
}

#[async_trait]
impl PresenceCache for RedisPresenceCache {
    async fn set(&self, record: &PresenceRecord) -> Result<(), ApplicationError> {
        let mut conn = self.get_connection().await?;
        let key = self.presence_key(record.user_id);

        let payload = serde_json::to_string(record).map_err(|e| {
            let message = format!("Failed to serialize presence record: {e}");
            ApplicationError::infrastructure(message)
        })?;

        let _: () = redis::cmd("SETEX")
            .arg(&key)
            .arg(PRESENCE_TTL_SECONDS)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                let message = format!("Redis operation failed: {e}");
                ApplicationError::infrastructure(message)
            })?;

        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<PresenceRecord>, ApplicationError> {
        let mut conn = self.get_connection().await?;
        let key = self.presence_key(user_id);

        let value: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                let message = format!("Redis operation failed: {e}");
                ApplicationError::infrastructure(message)
            })?;

        value.as_deref().map(Self::parse_record).transpose()
    }

    async fn get_bulk(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Option<PresenceRecord>>, ApplicationError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_connection().await?;

        // 使用Redis管道，单次往返批量读取
        let mut pipe = redis::pipe();
        for user_id in user_ids {
            pipe.get(self.presence_key(*user_id));
        }

        let values: Vec<Option<String>> =
            pipe.query_async(&mut conn).await.map_err(|e| {
                let message = format!("Redis operation failed: {e}");
                ApplicationError::infrastructure(message)
            })?;

        values
            .iter()
            .map(|value| value.as_deref().map(Self::parse_record).transpose())
            .collect()
    }

    async fn extend_ttl(&self, user_id: Uuid) -> Result<(), ApplicationError> {
        let mut conn = self.get_connection().await?;
        let key = self.presence_key(user_id);

        // 键不存在时 EXPIRE 返回 0，无副作用
        let _: i64 = redis::cmd("EXPIRE")
            .arg(&key)
            .arg(PRESENCE_TTL_SECONDS)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                let message = format!("Redis operation failed: {e}");
                ApplicationError::infrastructure(message)
            })?;

        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), ApplicationError> {
        let mut conn = self.get_connection().await?;
        let key = self.presence_key(user_id);

        let _: i64 = redis::cmd("DEL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                let message = format!("Redis operation failed: {e}");
                ApplicationError::infrastructure(message)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::PresenceStatus;

    #[test]
    fn test_presence_key_format() {
        let client = Arc::new(redis::Client::open("redis://localhost:6379").unwrap());
        let cache = RedisPresenceCache::new(client);
        let user_id = Uuid::new_v4();

        assert_eq!(cache.presence_key(user_id), format!("presence:{user_id}"));
    }

    #[test]
    fn test_cached_value_round_trip() {
        let record = PresenceRecord::new(Uuid::new_v4(), PresenceStatus::Busy, Utc::now());
        let json = serde_json::to_string(&record).unwrap();

        let parsed = RedisPresenceCache::parse_record(&json).unwrap();
        assert_eq!(parsed, record);

        assert!(RedisPresenceCache::parse_record("not json").is_err());
    }
}
