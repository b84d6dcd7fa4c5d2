//! Transactional email over an HTTP mail relay.
//!
//! The relay endpoint accepts a JSON message and does the actual SMTP work;
//! this module only builds and posts the payloads. Delivery failures surface
//! to the caller; there is no retry queue.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::Config;

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    relay_url: String,
    from: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl Mailer {
    /// Build a mailer from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            relay_url: config.mail_relay_url.clone(),
            from: config.mail_from.clone(),
            api_key: config.mail_api_key.clone(),
        }
    }

    /// Post one message to the relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay is unreachable or rejects the message.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = RelayMessage {
            from: &self.from,
            to,
            subject,
            body,
        };

        let mut request = self.client.post(&self.relay_url).json(&message);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.context("Failed to reach mail relay")?;

        if !response.status().is_success() {
            anyhow::bail!("Mail relay rejected message with status {}", response.status());
        }

        info!(to = %to, subject = %subject, "Sent mail");
        Ok(())
    }

    /// Password-change mail carrying the single-use reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails.
    pub async fn send_password_reset(&self, to: &str, nickname: &str, token: &str) -> Result<()> {
        let subject = "Password change link";
        let body = format!(
            "Hello {nickname},\n\n\
             A password change was requested for your account. Use the link\n\
             below within the next hour to pick a new password:\n\n\
             https://campus.market/password/reset?token={token}\n\n\
             If you did not request this, you can ignore this mail."
        );

        self.send(to, subject, &body).await
    }

    /// Forward a member question to the operations inbox, with any uploaded
    /// photo keys appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails.
    pub async fn send_question(
        &self,
        operations_inbox: &str,
        nickname: &str,
        reply_to: &str,
        title: &str,
        description: &str,
        photo_keys: &[String],
    ) -> Result<()> {
        let subject = format!("[Question] {title}");

        let mut body = format!(
            "From: {nickname} <{reply_to}>\n\n{description}\n"
        );
        if !photo_keys.is_empty() {
            body.push_str("\nAttached photos:\n");
            for key in photo_keys {
                body.push_str(key);
                body.push('\n');
            }
        }

        self.send(operations_inbox, &subject, &body).await
    }
}
