mod materializer;
mod notification_service;
mod presence_service;

pub use materializer::NotificationMaterializer;
pub use notification_service::{NotificationPage, NotificationService};
pub use presence_service::{PresenceService, PresenceServiceDependencies};
