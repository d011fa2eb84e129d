use async_trait::async_trait;

use super::NotificationGateway;

/// Gateway that only records the message in the log. Always delivers.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotificationGateway;

impl LoggingNotificationGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for LoggingNotificationGateway {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        tracing::info!(
            recipient = recipient,
            subject = subject,
            body_len = body.len(),
            "📧 Notification sent"
        );
        true
    }
}
