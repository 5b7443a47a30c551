//! Delivering the digest.
//!
//! Single attempt per call, no retry.  `Pushover` is the real thing, `Stdout` is for dry runs.
//!

use std::fmt::{Debug, Formatter};
use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use clap::{crate_name, crate_version};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, trace};

use crate::NotificationError;

/// Pushover message endpoint
pub const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Notification title
pub const TITLE: &str = "🌍 Earthquake Alert";

/// Anything that can deliver a text message somewhere.
///
#[async_trait]
pub trait Notifier: Debug + Send + Sync {
    fn name(&self) -> String;
    async fn send(&self, message: &str) -> Result<(), NotificationError>;
}

/// Pushover application token and user key.
///
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub app_token: String,
    pub user_key: String,
}

impl Debug for Credentials {
    /// Obfuscate the token, keep the user key recognizable
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let user = self.user_key.chars().take(4).collect::<String>();
        f.debug_struct("Credentials")
            .field("app_token", &"HIDDEN")
            .field("user_key", &format!("{user}…"))
            .finish()
    }
}

/// Pushover client.
///
#[derive(Clone, Debug)]
pub struct Pushover {
    credentials: Credentials,
    /// Message endpoint, changed only for tests
    pub url: String,
    pub title: String,
    pub priority: i8,
    pub sound: String,
    timeout: Duration,
    client: Client,
}

impl Pushover {
    #[tracing::instrument]
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, NotificationError> {
        trace!("pushover::new");

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Pushover {
            credentials,
            url: PUSHOVER_URL.to_string(),
            title: TITLE.to_string(),
            priority: 0,
            sound: "cosmic".to_string(),
            timeout,
            client,
        })
    }

    /// Use another endpoint
    ///
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    fn form(&self, message: &str) -> [(&'static str, String); 6] {
        [
            ("token", self.credentials.app_token.clone()),
            ("user", self.credentials.user_key.clone()),
            ("message", message.to_string()),
            ("title", self.title.clone()),
            ("priority", self.priority.to_string()),
            ("sound", self.sound.clone()),
        ]
    }
}

#[async_trait]
impl Notifier for Pushover {
    fn name(&self) -> String {
        "pushover".to_string()
    }

    #[tracing::instrument(skip(self, message))]
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        debug!("sending {} bytes to {}", message.len(), self.url);

        let form = self.form(message);
        let resp = http_post_form!(self, &self.url, &form).await.map_err(|e| {
            if e.is_timeout() {
                NotificationError::Timeout(self.timeout.as_secs())
            } else {
                NotificationError::HTTP(e)
            }
        })?;

        let code = resp.status();
        if code != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotificationError::Status {
                code: code.as_u16(),
                body,
            });
        }
        info!("Pushover notification sent successfully");
        Ok(())
    }
}

/// Print the message on stdout instead of sending it.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

#[async_trait]
impl Notifier for Stdout {
    fn name(&self) -> String {
        "stdout".to_string()
    }

    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}\n{}", TITLE, message)?;
        Ok(out.flush()?)
    }
}
