//! 基础设施层实现。
//!
//! 提供应用层接口的适配器：PostgreSQL 仓储、Redis TTL 缓存、
//! Kafka 事件生产者与消费者。

pub mod config;
pub mod db;
pub mod kafka;
pub mod redis;
pub mod repository;

pub use config::{KafkaConfig, MessagingConfig, RedisConfig};
pub use db::repositories::{PgNotificationRepository, PgPresenceRepository};
pub use kafka::{KafkaError, KafkaEventConsumer, KafkaEventProducer, KafkaResult};
pub use redis::{RedisPresenceCache, PRESENCE_TTL_SECONDS};
pub use repository::create_pg_pool;
