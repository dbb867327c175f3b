//! 短时缓存抽象
//!
//! 缓存副本带固定 TTL，键存在与否隐含表示用户的"在线感"。
//! 缓存缺失只是未命中，需要回落到持久存储，不代表用户离线。

use async_trait::async_trait;
use domain::PresenceRecord;
use uuid::Uuid;

use crate::error::ApplicationError;

/// 在线状态缓存接口
#[async_trait]
pub trait PresenceCache: Send + Sync {
    /// 写入缓存并刷新 TTL
    async fn set(&self, record: &PresenceRecord) -> Result<(), ApplicationError>;

    /// 读取单个用户的缓存副本
    async fn get(&self, user_id: Uuid) -> Result<Option<PresenceRecord>, ApplicationError>;

    /// 批量读取，单次往返；结果顺序与输入一致，未命中为 None
    async fn get_bulk(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Option<PresenceRecord>>, ApplicationError>;

    /// 仅延长 TTL，不改变缓存内容；键不存在时无副作用
    async fn extend_ttl(&self, user_id: Uuid) -> Result<(), ApplicationError>;

    /// 删除缓存副本
    async fn delete(&self, user_id: Uuid) -> Result<(), ApplicationError>;
}

/// 内存实现的在线状态缓存（用于测试和本地运行）
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryPresenceCache {
        entries: RwLock<HashMap<Uuid, PresenceRecord>>,
    }

    impl MemoryPresenceCache {
        pub fn new() -> Self {
            Self::default()
        }

        /// 模拟 TTL 过期，从缓存中移除条目
        pub async fn evict(&self, user_id: Uuid) {
            self.entries.write().await.remove(&user_id);
        }
    }

    #[async_trait]
    impl PresenceCache for MemoryPresenceCache {
        async fn set(&self, record: &PresenceRecord) -> Result<(), ApplicationError> {
            self.entries
                .write()
                .await
                .insert(record.user_id, record.clone());
            Ok(())
        }

        async fn get(&self, user_id: Uuid) -> Result<Option<PresenceRecord>, ApplicationError> {
            Ok(self.entries.read().await.get(&user_id).cloned())
        }

        async fn get_bulk(
            &self,
            user_ids: &[Uuid],
        ) -> Result<Vec<Option<PresenceRecord>>, ApplicationError> {
            let entries = self.entries.read().await;
            Ok(user_ids.iter().map(|id| entries.get(id).cloned()).collect())
        }

        async fn extend_ttl(&self, _user_id: Uuid) -> Result<(), ApplicationError> {
            // 内存实现不跟踪过期时间，键不存在时同样无副作用
            Ok(())
        }

        async fn delete(&self, user_id: Uuid) -> Result<(), ApplicationError> {
            self.entries.write().await.remove(&user_id);
            Ok(())
        }
    }
}
