//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：在线状态管理器、通知读取服务、
//! 事件分发注册表与通知物化器，以及对外部适配器
//! （持久存储、TTL 缓存、事件总线）的抽象。

pub mod cache;
pub mod clock;
pub mod dispatch;
pub mod error;
pub mod publisher;
pub mod repository;
pub mod services;

pub use cache::PresenceCache;
pub use clock::{Clock, SystemClock};
pub use dispatch::{EventHandler, HandlerRegistry};
pub use error::ApplicationError;
pub use publisher::EventPublisher;
pub use services::{
    NotificationMaterializer, NotificationPage, NotificationService, PresenceService,
    PresenceServiceDependencies,
};
