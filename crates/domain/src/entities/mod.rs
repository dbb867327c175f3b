//! 领域实体定义

pub mod notification;
pub mod presence;

pub use notification::{Notification, NotificationData, NotificationType};
pub use presence::{PresenceRecord, PresenceStatus};
