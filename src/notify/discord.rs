// src/notify/discord.rs

//! Discord webhook delivery.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;

use super::{Announcement, Notifier};

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

/// One Discord webhook endpoint.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    url: String,
    role_id: Option<String>,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>, role_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            role_id,
        }
    }

    /// Build the JSON body for a message.
    ///
    /// With a role configured, the content starts with the role mention and
    /// only that role is allowed to be pinged.
    pub fn payload(&self, content: &str) -> Value {
        let content = match &self.role_id {
            Some(role) => format!("<@&{role}>\n{content}"),
            None => content.to_string(),
        };

        let mut payload = json!({
            "content": truncate(&content, MAX_CONTENT_CHARS),
            "tts": false,
        });
        if let Some(role) = &self.role_id {
            payload["allowed_mentions"] = json!({ "roles": [role] });
        }
        payload
    }

    /// Post a message to the webhook.
    pub async fn send(&self, client: &reqwest::Client, content: &str) -> Result<()> {
        let response = client
            .post(&self.url)
            .json(&self.payload(content))
            .send()
            .await
            .map_err(AppError::delivery)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::delivery(format!("webhook returned {status}: {body}")));
        }
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Sends every announcement to all configured webhooks.
pub struct WebhookNotifier {
    client: reqwest::Client,
    hooks: Vec<DiscordWebhook>,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, hooks: Vec<DiscordWebhook>) -> Self {
        Self { client, hooks }
    }

    /// Build the notifier from settings.
    pub fn from_config(client: reqwest::Client, config: &NotifierConfig) -> Self {
        let hooks = config
            .webhooks
            .iter()
            .map(|url| DiscordWebhook::new(url, config.role_id.clone()))
            .collect();
        Self::new(client, hooks)
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, announcement: &Announcement) -> Result<()> {
        let content = announcement.content();
        let results = join_all(
            self.hooks
                .iter()
                .map(|hook| hook.send(&self.client, &content)),
        )
        .await;

        let failures = results
            .iter()
            .filter(|r| r.is_err())
            .count();
        for err in results.into_iter().filter_map(|r| r.err()) {
            log::warn!("Webhook delivery failed: {}", err);
        }

        if failures > 0 {
            return Err(AppError::delivery(format!(
                "{} of {} webhook(s) failed",
                failures,
                self.hooks.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_without_role() {
        let hook = DiscordWebhook::new("https://discord.example/api/webhooks/1/x", None);
        let payload = hook.payload("hello");

        assert_eq!(payload["content"], "hello");
        assert_eq!(payload["tts"], false);
        assert!(payload.get("allowed_mentions").is_none());
    }

    #[test]
    fn test_payload_mentions_role() {
        let hook = DiscordWebhook::new("https://discord.example/api/webhooks/1/x", Some("42".into()));
        let payload = hook.payload("hello");

        assert_eq!(payload["content"], "<@&42>\nhello");
        assert_eq!(payload["allowed_mentions"]["roles"][0], "42");
    }

    #[test]
    fn test_payload_is_truncated() {
        let hook = DiscordWebhook::new("https://discord.example/api/webhooks/1/x", None);
        let long = "é".repeat(MAX_CONTENT_CHARS + 10);
        let content = hook.payload(&long)["content"].as_str().unwrap().to_string();

        assert_eq!(content.chars().count(), MAX_CONTENT_CHARS);
        assert!(content.ends_with('…'));
    }

    #[test]
    fn test_from_config_builds_one_hook_per_url() {
        let config = NotifierConfig {
            webhooks: vec!["https://a.example/1".into(), "https://b.example/2".into()],
            role_id: Some("7".into()),
        };
        let notifier = WebhookNotifier::from_config(reqwest::Client::new(), &config);
        assert_eq!(notifier.hook_count(), 2);
    }

    #[tokio::test]
    async fn test_no_hooks_is_ok() {
        let notifier = WebhookNotifier::new(reqwest::Client::new(), Vec::new());
        assert!(notifier.send(&Announcement::new("x")).await.is_ok());
    }
}
