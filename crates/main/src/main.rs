//! 主应用程序入口
//!
//! 启动在线状态服务：装配 PostgreSQL 仓储、Redis 缓存与 Kafka 生产者，
//! 对网关暴露 HTTP API。

use std::sync::Arc;

use application::{
    publisher::memory::NoopEventPublisher, NotificationService, PresenceService,
    PresenceServiceDependencies, SystemClock,
};
use config::AppConfig;
use infrastructure::{
    create_pg_pool, KafkaConfig, KafkaEventProducer, PgNotificationRepository,
    PgPresenceRepository, RedisPresenceCache,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').last().unwrap_or("unknown")
    );

    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    let presence_repository = Arc::new(PgPresenceRepository::new(pg_pool.clone()));
    let notification_repository = Arc::new(PgNotificationRepository::new(pg_pool));

    let redis_client = Arc::new(redis::Client::open(config.redis.url.clone())?);
    let cache: Arc<dyn application::PresenceCache> =
        Arc::new(RedisPresenceCache::new(redis_client));

    // broker 不可达时降级运行：状态写入照常，事件不再传播
    let kafka_config = KafkaConfig {
        brokers: config.kafka.brokers.clone(),
        consumer_group_id: config.kafka.consumer_group_id.clone(),
        ..KafkaConfig::default()
    };
    let publisher: Arc<dyn application::EventPublisher> =
        match KafkaEventProducer::new(&kafka_config) {
            Ok(producer) => Arc::new(producer),
            Err(e) => {
                tracing::warn!(error = %e, "Kafka 生产者创建失败，事件发布降级为 No-op");
                Arc::new(NoopEventPublisher)
            }
        };

    let presence_service = Arc::new(PresenceService::new(PresenceServiceDependencies {
        repository: presence_repository,
        cache,
        publisher,
        clock: Arc::new(SystemClock),
    }));
    let notification_service = Arc::new(NotificationService::new(notification_repository));

    let state = AppState::new(presence_service, notification_service);

    // 启动 Web 服务器
    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("在线状态服务启动在 http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
