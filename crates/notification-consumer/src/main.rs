//! Notification Consumer 服务
//!
//! 以消费者组身份订阅事件主题，把 `message.created` 等事件
//! 物化为可查询的通知记录。

use std::sync::Arc;

use application::{HandlerRegistry, NotificationMaterializer, NotificationService};
use config::AppConfig;
use infrastructure::{
    create_pg_pool, KafkaConfig, KafkaEventConsumer, PgNotificationRepository,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    let notification_repository = Arc::new(PgNotificationRepository::new(pg_pool));
    let notification_service = Arc::new(NotificationService::new(notification_repository));

    // 处理器注册必须在消费者启动前完成
    let mut registry = HandlerRegistry::new();
    let materializer = NotificationMaterializer::new(notification_service);
    materializer.register_handlers(&mut registry);

    let kafka_config = KafkaConfig {
        brokers: config.kafka.brokers.clone(),
        consumer_group_id: config.kafka.consumer_group_id.clone(),
        ..KafkaConfig::default()
    };
    let consumer = KafkaEventConsumer::new(&kafka_config, registry)?;

    tracing::info!(
        consumer_group = %kafka_config.consumer_group_id,
        topics = ?kafka_config.topics,
        "Notification Consumer 开始运行"
    );

    tokio::select! {
        result = consumer.subscribe_and_run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("收到退出信号");
            consumer.shutdown().await;
        }
    }

    Ok(())
}
