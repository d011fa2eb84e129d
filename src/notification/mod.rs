use async_trait::async_trait;
use std::time::Duration;

mod logging;

pub use logging::LoggingNotificationGateway;

// ============================================================================
// Notification Gateway
// ============================================================================
//
// Outbound messages to customers. Delivery failure is reported as `false`,
// never as an error, so the enrollment core decides what a failure means.
//
// ============================================================================

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Returns true when the message was delivered
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool;
}

/// Call the gateway, treating an elapsed `timeout` like a failed delivery.
pub async fn send_with_timeout(
    gateway: &dyn NotificationGateway,
    timeout: Duration,
    recipient: &str,
    subject: &str,
    body: &str,
) -> bool {
    match tokio::time::timeout(timeout, gateway.send(recipient, subject, body)).await {
        Ok(delivered) => delivered,
        Err(_) => {
            tracing::warn!(
                recipient = recipient,
                timeout_ms = timeout.as_millis() as u64,
                "Notification timed out"
            );
            false
        }
    }
}
