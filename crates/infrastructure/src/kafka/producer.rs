//! Kafka 事件生产者
//!
//! 使用实体ID（用户ID / 消息ID）作为分区键，保证同一实体事件的有序性。
//! 至少一次语义：瞬时错误有界重试并指数退避；重试耗尽后返回错误，
//! 由调用方记录日志而不阻断主写路径。

use application::{ApplicationError, EventPublisher};
use async_trait::async_trait;
use domain::EventRecord;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::kafka::{KafkaError, KafkaResult};
use crate::KafkaConfig;

/// Kafka 事件生产者
///
/// 每条事件发送到与其事件类型同名的主题，
/// 传输头携带 `event-type` 和 `event-id` 供消费方免反序列化路由。
pub struct KafkaEventProducer {
    producer: FutureProducer,
    config: KafkaConfig,
}

impl KafkaEventProducer {
    /// 创建新的 Kafka 生产者
    pub fn new(config: &KafkaConfig) -> KafkaResult<Self> {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", config.brokers.join(","))
            .set("message.timeout.ms", config.send_timeout_ms.to_string())
            .set("acks", &config.acks)
            .set("retries", config.retry_count.to_string())
            .set("batch.size", config.batch_size.to_string())
            .set("linger.ms", config.linger_ms.to_string())
            .set("compression.type", "snappy")
            .set("enable.idempotence", "true")
            .set("max.in.flight.requests.per.connection", "5");

        let producer: FutureProducer =
            client_config
                .create()
                .map_err(|e| KafkaError::ConfigError {
                    message: format!("创建 Kafka 生产者失败: {}", e),
                })?;

        info!("Kafka 生产者创建成功，连接到: {}", config.brokers.join(","));

        Ok(Self {
            producer,
            config: config.clone(),
        })
    }

    /// 发送事件记录
    pub async fn send_event(&self, record: &EventRecord) -> KafkaResult<()> {
        let payload = serde_json::to_string(record).map_err(|e| KafkaError::SerializationError {
            message: format!("序列化事件失败: {}", e),
        })?;

        let partition_key = record.partition_key();
        let event_id = record.event_id.to_string();

        self.send_with_retry(
            record.topic(),
            &payload,
            &partition_key,
            record.event_type(),
            &event_id,
            0,
        )
        .await
    }

    /// 带重试的发送
    async fn send_with_retry(
        &self,
        topic: &str,
        payload: &str,
        partition_key: &str,
        event_type: &str,
        event_id: &str,
        retry_count: u32,
    ) -> KafkaResult<()> {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "event-type",
                value: Some(event_type),
            })
            .insert(Header {
                key: "event-id",
                value: Some(event_id),
            });

        let record = FutureRecord::to(topic)
            .payload(payload)
            .key(partition_key)
            .headers(headers);

        let timeout = Duration::from_millis(self.config.send_timeout_ms as u64);

        match self.producer.send(record, Timeout::After(timeout)).await {
            Ok(_) => {
                if retry_count > 0 {
                    info!("事件 {} 重试 {} 次后发送成功", event_type, retry_count);
                }
                Ok(())
            }
            Err((kafka_err, _)) => {
                if retry_count < self.config.retry_count {
                    warn!(
                        "事件 {} 发送失败，第 {} 次重试: {}",
                        event_type,
                        retry_count + 1,
                        kafka_err
                    );

                    // 指数退避
                    let delay = Duration::from_millis(100 * (2_u64.pow(retry_count)));
                    sleep(delay).await;

                    // 使用 Box::pin 来处理递归
                    return Box::pin(self.send_with_retry(
                        topic,
                        payload,
                        partition_key,
                        event_type,
                        event_id,
                        retry_count + 1,
                    ))
                    .await;
                }

                error!(
                    "事件 {} 发送失败，已达最大重试次数: {}",
                    event_type, kafka_err
                );
                Err(KafkaError::ProducerError {
                    message: format!("发送失败: {}", kafka_err),
                })
            }
        }
    }

    /// 刷新生产者缓冲区
    pub async fn flush(&self) -> KafkaResult<()> {
        self.producer
            .flush(Timeout::After(Duration::from_secs(10)))
            .map_err(|e| KafkaError::ProducerError {
                message: format!("刷新生产者缓冲区失败: {}", e),
            })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventProducer {
    async fn publish(&self, record: EventRecord) -> Result<(), ApplicationError> {
        self.send_event(&record).await?;
        Ok(())
    }
}

impl Drop for KafkaEventProducer {
    fn drop(&mut self) {
        info!("Kafka 生产者正在关闭");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{EventPayload, PresenceStatus};
    use uuid::Uuid;

    fn create_test_config() -> KafkaConfig {
        KafkaConfig {
            brokers: vec!["localhost:9092".to_string()],
            topics: vec!["presence.updated".to_string()],
            consumer_group_id: "test-group".to_string(),
            send_timeout_ms: 1000,
            retry_count: 2,
            acks: "1".to_string(),
            batch_size: 1024,
            linger_ms: 1,
        }
    }

    fn create_test_event() -> EventRecord {
        EventRecord::new(EventPayload::PresenceUpdated {
            user_id: Uuid::new_v4(),
            status: PresenceStatus::Online,
            last_seen_at: Some(Utc::now()),
        })
    }

    #[test]
    fn test_producer_creation() {
        let config = create_test_config();

        // 注意：这个测试需要运行 Kafka 实例才能通过
        // 在 CI 环境中可能需要跳过或使用 mock
        if std::env::var("KAFKA_INTEGRATION_TEST").is_ok() {
            let producer = KafkaEventProducer::new(&config);
            assert!(producer.is_ok());
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = create_test_event();
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());

        let deserialized: Result<EventRecord, _> = serde_json::from_str(&json.unwrap());
        assert!(deserialized.is_ok());
    }

    #[test]
    fn test_topic_and_partition_key() {
        let event = create_test_event();
        assert_eq!(event.topic(), "presence.updated");
        assert!(!event.partition_key().is_empty());
    }
}
