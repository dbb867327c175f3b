//! 基础设施配置
//!
//! 定义 Kafka 和 Redis 的连接配置。

use serde::{Deserialize, Serialize};

/// Kafka 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Kafka 服务器地址列表
    pub brokers: Vec<String>,
    /// 消费者订阅的主题列表
    pub topics: Vec<String>,
    /// 消费者组ID
    pub consumer_group_id: String,
    /// 消息发送超时时间（毫秒）
    pub send_timeout_ms: u32,
    /// 发送重试次数
    pub retry_count: u32,
    /// 确认模式（all, 1, 0）
    pub acks: String,
    /// 批量大小
    pub batch_size: u32,
    /// 延迟时间（毫秒）
    pub linger_ms: u32,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topics: vec![
                domain::topics::MESSAGE_CREATED.to_string(),
                domain::topics::MESSAGE_UPDATED.to_string(),
                domain::topics::PRESENCE_UPDATED.to_string(),
            ],
            consumer_group_id: "notification-service-group".to_string(),
            send_timeout_ms: 5000,
            retry_count: 3,
            acks: "all".to_string(),
            batch_size: 16384,
            linger_ms: 5,
        }
    }
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis 服务器地址
    pub url: String,
    /// 连接超时时间（毫秒）
    pub connection_timeout_ms: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout_ms: 3000,
        }
    }
}

/// 消息架构配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessagingConfig {
    /// Kafka 配置
    pub kafka: KafkaConfig,
    /// Redis 配置
    pub redis: RedisConfig,
}

impl MessagingConfig {
    /// 验证配置
    pub fn validate(&self) -> Result<(), String> {
        if self.kafka.brokers.is_empty() {
            return Err("Kafka brokers cannot be empty".to_string());
        }

        if self.kafka.topics.is_empty() {
            return Err("Kafka topics cannot be empty".to_string());
        }

        if self.kafka.consumer_group_id.is_empty() {
            return Err("Kafka consumer group ID cannot be empty".to_string());
        }

        if self.redis.url.is_empty() {
            return Err("Redis URL cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let kafka_config = KafkaConfig::default();
        assert!(!kafka_config.brokers.is_empty());
        assert!(kafka_config
            .topics
            .contains(&"message.created".to_string()));
        assert_eq!(kafka_config.acks, "all");

        let redis_config = RedisConfig::default();
        assert_eq!(redis_config.url, "redis://localhost:6379");
    }

    #[test]
    fn test_config_validation() {
        let mut config = MessagingConfig::default();
        assert!(config.validate().is_ok());

        config.kafka.brokers.clear();
        assert!(config.validate().is_err());

        config.kafka.brokers = vec!["localhost:9092".to_string()];
        config.redis.url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = MessagingConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MessagingConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.kafka.brokers, deserialized.kafka.brokers);
        assert_eq!(config.redis.url, deserialized.redis.url);
    }
}
