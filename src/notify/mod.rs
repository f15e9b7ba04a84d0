//! Outbound notifications.
//!
//! - `message`: renders change events into announcements
//! - `discord`: delivers announcements to Discord webhooks

pub mod discord;
pub mod message;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use discord::{DiscordWebhook, WebhookNotifier};
pub use message::render;

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub summary: String,
    pub detail: Option<String>,
}

impl Announcement {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Summary and detail joined into one message body.
    pub fn content(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}\n{}", self.summary, detail),
            None => self.summary.clone(),
        }
    }
}

/// Delivers announcements.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, announcement: &Announcement) -> Result<()>;
}

/// Notifier that only writes announcements to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, announcement: &Announcement) -> Result<()> {
        log::info!("[dry-run] {}", announcement.content());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_joins_detail() {
        let plain = Announcement::new("Shop updated");
        assert_eq!(plain.content(), "Shop updated");

        let detailed = Announcement::new("Shop updated").with_detail("- Halo");
        assert_eq!(detailed.content(), "Shop updated\n- Halo");
    }
}
