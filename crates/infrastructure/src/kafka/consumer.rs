//! Kafka 事件消费者
//!
//! 以固定消费者组身份订阅主题集合，组内成员分摊分区负载。
//! 应用层策略是每次投递至多处理一次：处理器异常被吸收后
//! 偏移量照常推进，不重投、不进死信队列。

use application::HandlerRegistry;
use domain::EventRecord;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Headers, Message};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::kafka::{KafkaError, KafkaResult};
use crate::KafkaConfig;

/// Kafka 事件消费者
///
/// 处理器注册表在构造时整体移入，启动后不再变化。
pub struct KafkaEventConsumer {
    consumer: StreamConsumer,
    topics: Vec<String>,
    registry: HandlerRegistry,
    shutdown_signal: Arc<AtomicBool>,
}

impl KafkaEventConsumer {
    /// 创建新的 Kafka 消费者
    pub fn new(config: &KafkaConfig, registry: HandlerRegistry) -> KafkaResult<Self> {
        let mut client_config = ClientConfig::new();

        client_config
            .set("group.id", &config.consumer_group_id)
            .set("bootstrap.servers", config.brokers.join(","))
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "10000")
            .set("heartbeat.interval.ms", "3000")
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "1000")
            .set("auto.offset.reset", "latest")
            .set("fetch.wait.max.ms", "100");

        let consumer: StreamConsumer =
            client_config
                .create()
                .map_err(|e| KafkaError::ConfigError {
                    message: format!("创建 Kafka 消费者失败: {}", e),
                })?;

        info!(
            "Kafka 消费者创建成功，消费者组: {}",
            config.consumer_group_id
        );

        Ok(Self {
            consumer,
            topics: config.topics.clone(),
            registry,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        })
    }

    /// 订阅主题并开始消费
    pub async fn subscribe_and_run(&self) -> KafkaResult<()> {
        let topic_refs: Vec<&str> = self.topics.iter().map(String::as_str).collect();

        self.consumer
            .subscribe(&topic_refs)
            .map_err(|e| KafkaError::ConsumerError {
                message: format!("订阅主题失败: {}", e),
            })?;

        info!("已订阅主题: {:?}", self.topics);

        self.consume_loop().await
    }

    /// 消费循环
    async fn consume_loop(&self) -> KafkaResult<()> {
        let mut retry_count = 0;
        const MAX_RETRIES: u32 = 5;

        while !self.shutdown_signal.load(Ordering::Relaxed) {
            match self.consumer.recv().await {
                Ok(message) => {
                    retry_count = 0; // 重置重试计数

                    if let Err(e) = self.process_message(&message).await {
                        // 继续处理下一条消息，不中断消费
                        error!("处理消息失败: {}", e);
                    }
                }
                Err(e) => {
                    error!("接收消息失败: {}", e);
                    retry_count += 1;

                    if retry_count >= MAX_RETRIES {
                        error!("达到最大重试次数，停止消费");
                        return Err(KafkaError::ConsumerError {
                            message: format!("消费失败，已重试 {} 次", MAX_RETRIES),
                        });
                    }

                    // 指数退避
                    let delay = Duration::from_millis(1000 * (2_u64.pow(retry_count - 1)));
                    warn!("等待 {:?} 后重试...", delay);
                    sleep(delay).await;
                }
            }
        }

        info!("消费循环已停止");
        Ok(())
    }

    /// 处理单条消息
    ///
    /// 事件类型优先从 `event-type` 头部提取，缺失时回退到载荷字段。
    async fn process_message(&self, message: &BorrowedMessage<'_>) -> KafkaResult<()> {
        let payload = message
            .payload()
            .ok_or_else(|| KafkaError::DeserializationError {
                message: "消息负载为空".to_string(),
            })?;

        let record: EventRecord =
            serde_json::from_slice(payload).map_err(|e| KafkaError::DeserializationError {
                message: format!("反序列化事件失败: {}", e),
            })?;

        let header_event_type = message.headers().and_then(|headers| {
            headers
                .iter()
                .find(|header| header.key == "event-type")
                .and_then(|header| header.value)
                .and_then(|value| std::str::from_utf8(value).ok())
        });
        let event_type = header_event_type.unwrap_or_else(|| record.event_type());

        debug!(
            "接收到事件: {} (分区: {}, 偏移量: {})",
            event_type,
            message.partition(),
            message.offset()
        );

        // 分发吸收处理器错误，偏移量随自动提交照常推进
        self.registry.dispatch(event_type, &record).await;

        Ok(())
    }

    /// 优雅关闭消费者
    pub async fn shutdown(&self) {
        info!("开始关闭 Kafka 消费者");
        self.shutdown_signal.store(true, Ordering::Relaxed);

        // 等待一段时间让消费循环退出
        sleep(Duration::from_millis(1000)).await;

        info!("Kafka 消费者已关闭");
    }

    /// 检查消费者是否正在运行
    pub fn is_running(&self) -> bool {
        !self.shutdown_signal.load(Ordering::Relaxed)
    }
}

impl Drop for KafkaEventConsumer {
    fn drop(&mut self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        info!("Kafka 消费者正在释放资源");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> KafkaConfig {
        KafkaConfig {
            brokers: vec!["localhost:9092".to_string()],
            topics: vec![
                "message.created".to_string(),
                "presence.updated".to_string(),
            ],
            consumer_group_id: "test-consumer-group".to_string(),
            send_timeout_ms: 1000,
            retry_count: 2,
            acks: "1".to_string(),
            batch_size: 1024,
            linger_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_consumer_creation() {
        let config = create_test_config();

        if std::env::var("KAFKA_INTEGRATION_TEST").is_ok() {
            let consumer = KafkaEventConsumer::new(&config, HandlerRegistry::new());
            assert!(consumer.is_ok());
        }
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let config = create_test_config();

        if std::env::var("KAFKA_INTEGRATION_TEST").is_ok() {
            let consumer = KafkaEventConsumer::new(&config, HandlerRegistry::new()).unwrap();
            assert!(consumer.is_running());

            consumer.shutdown().await;
            assert!(!consumer.is_running());
        }
    }
}
