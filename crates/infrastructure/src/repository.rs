//! 数据库连接与错误映射辅助

use domain::DomainError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// 创建 PostgreSQL 连接池
pub async fn create_pg_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub(crate) fn map_sqlx_err(err: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(err.to_string())
}

pub(crate) fn invalid_data(message: impl Into<String>) -> DomainError {
    DomainError::DatabaseError(message.into())
}
