//! 数据库适配器

pub mod repositories;

/// 数据库连接池类型
pub type DbPool = sqlx::PgPool;
