// Email dispatch via a Resend-compatible HTTP API
// Used for delivering connection one-time codes to buyers.

use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::app_config::config;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email send error: {0}")]
    SendError(String),

    #[error("Email provider rate limit exceeded")]
    RateLimitExceeded,

    #[error("Email provider unavailable")]
    ServiceUnavailable,
}

#[derive(Debug, Clone, Serialize)]
struct EmailPayload {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

#[derive(Clone)]
pub struct EmailSender {
    client: Arc<Client>,
    api_url: String,
    api_key: String,
    from_address: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl EmailSender {
    pub fn from_config() -> Self {
        let cfg = &config().email;
        Self::new(
            cfg.api_url.clone(),
            cfg.api_key.clone(),
            cfg.from_address.clone(),
        )
    }

    pub fn new(api_url: String, api_key: String, from_address: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_url,
            api_key,
            from_address,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    async fn send_once(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let payload = EmailPayload {
            from: self.from_address.clone(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!(to = %to, "Email sent");
                Ok(())
            },
            Ok(res) => {
                let status = res.status();
                let body = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                error!(%status, %body, "Email send failed");

                if status.as_u16() == 429 {
                    Err(EmailError::RateLimitExceeded)
                } else if status.is_server_error() {
                    Err(EmailError::ServiceUnavailable)
                } else {
                    Err(EmailError::SendError(format!(
                        "status {}: {}",
                        status, body
                    )))
                }
            },
            Err(e) => {
                error!("Network error while sending email: {:?}", e);
                Err(EmailError::SendError(format!("Network error: {}", e)))
            },
        }
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.send_once(to, subject, html).await {
                Ok(()) => return Ok(()),
                Err(EmailError::RateLimitExceeded) => {
                    warn!("Rate limit hit, not retrying");
                    return Err(EmailError::RateLimitExceeded);
                },
                Err(e) => {
                    warn!("Email send attempt {} failed: {:?}", attempt, e);
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        let exp = 2_u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
                        let delay = self
                            .retry_delay
                            .checked_mul(exp)
                            .unwrap_or(Duration::from_secs(60));
                        tokio::time::sleep(delay).await;
                    }
                },
            }
        }

        Err(last_error
            .unwrap_or_else(|| EmailError::SendError("Failed after maximum retries".to_string())))
    }

    /// One-time code message for the agent-initiated connection flow
    pub async fn send_otp(&self, to: &str, agent_name: &str, code: &str) -> Result<(), EmailError> {
        let subject = "Κωδικός Επιβεβαίωσης Σύνδεσης";
        let html = format!(
            "<p>Ο μεσίτης {agent} σας προσκάλεσε να συνδεθείτε.</p>\
             <p>Ο κωδικός επιβεβαίωσης είναι: <strong>{code}</strong></p>\
             <p>Ο κωδικός λήγει σε 15 λεπτά.</p>",
            agent = agent_name,
            code = code,
        );

        self.send(to, subject, &html).await
    }
}
