//! Repository实现

pub mod notification_repository_impl;
pub mod presence_repository_impl;

pub use notification_repository_impl::PgNotificationRepository;
pub use presence_repository_impl::PgPresenceRepository;
