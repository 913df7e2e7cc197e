use super::Notifier;
use anyhow::Result;
use async_trait::async_trait;

/// Dry-run notifier: logs what would have been sent.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        tracing::info!(message = %message.replace('\n', " | "), "DRY RUN: would send");
        Ok(())
    }
}
