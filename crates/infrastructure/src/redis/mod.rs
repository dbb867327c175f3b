//! Redis 缓存模块
//!
//! 提供带 TTL 的在线状态缓存实现。

pub mod presence_cache;

pub use presence_cache::{RedisPresenceCache, PRESENCE_TTL_SECONDS};
