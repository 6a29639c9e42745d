// SMS dispatch through a JSON HTTP gateway
// The alternate delivery channel for connection one-time codes.

use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::app_config::config;

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("SMS gateway not configured")]
    NotConfigured,

    #[error("SMS send error: {0}")]
    SendError(String),
}

#[derive(Debug, Clone, Serialize)]
struct SmsPayload {
    from: String,
    to: String,
    text: String,
}

#[derive(Clone)]
pub struct SmsSender {
    client: Arc<Client>,
    api_url: String,
    api_key: String,
    sender_id: String,
}

impl SmsSender {
    pub fn from_config() -> Self {
        let cfg = &config().sms;
        Self {
            client: Arc::new(Client::new()),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            sender_id: cfg.sender_id.clone(),
        }
    }

    pub async fn send(&self, to: &str, text: &str) -> Result<(), SmsError> {
        if self.api_url.is_empty() {
            return Err(SmsError::NotConfigured);
        }

        let payload = SmsPayload {
            from: self.sender_id.clone(),
            to: to.to_string(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SmsError::SendError(format!("Network error: {}", e)))?;

        if response.status().is_success() {
            info!(to = %to, "SMS sent");
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(%status, %body, "SMS send failed");
            Err(SmsError::SendError(format!("status {}: {}", status, body)))
        }
    }

    pub async fn send_otp(&self, to: &str, code: &str) -> Result<(), SmsError> {
        let text = format!(
            "Ο κωδικός επιβεβαίωσης είναι: {}. Λήγει σε 15 λεπτά.",
            code
        );
        self.send(to, &text).await
    }
}
