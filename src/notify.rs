use crate::config::NotifyConfig;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Retry,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub run_id: Uuid,
    pub step: String,
    pub attempt: u32,
    pub message: String,
}

/// Outbound operator alerts for step retries and failed runs.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification);
}

/// Records notifications in the log, addressed to the configured operator.
///
/// Delivery (mail, chat) is left to whatever tails the log.
pub struct LogNotifier {
    recipient: Option<String>,
}

impl LogNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            recipient: config.email.clone(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) {
        let recipient = self.recipient.as_deref().unwrap_or("<unset>");
        match notification.kind {
            NotificationKind::Retry => warn!(
                run_id = %notification.run_id,
                step = %notification.step,
                attempt = notification.attempt,
                recipient,
                "Retrying step: {}",
                notification.message
            ),
            NotificationKind::Failure => error!(
                run_id = %notification.run_id,
                step = %notification.step,
                attempt = notification.attempt,
                recipient,
                "Pipeline run failed: {}",
                notification.message
            ),
        }
    }
}
