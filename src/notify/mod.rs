pub mod log_only;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Delivers a plain-text message to one preconfigured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

pub const NO_LISTINGS_WARNING: &str =
    "⚠️ No jobs loaded. The job board may have blocked the request or changed its layout.";

/// A listing that passed every filter and is about to be announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub title: String,
    pub link: String,
}

impl NotificationEvent {
    pub fn message(&self) -> String {
        format!("🔔 New Job Alert\n\nTitle: {}\n\nApply:\n{}", self.title, self.link)
    }
}
