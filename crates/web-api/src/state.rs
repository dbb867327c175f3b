use std::sync::Arc;

use application::{NotificationService, PresenceService};

#[derive(Clone)]
pub struct AppState {
    pub presence_service: Arc<PresenceService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    pub fn new(
        presence_service: Arc<PresenceService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            presence_service,
            notification_service,
        }
    }
}
