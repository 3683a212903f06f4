use async_trait::async_trait;

/// Port to the notification dispatcher
///
/// Delivery failures are the dispatcher's to log; the engine never
/// retries a notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, kind: &str, payload: serde_json::Value);
}
