mod alert;
pub mod webhook;

use std::future::Future;

use tracing::info;

use crate::config::{FetchConfig, NotifyConfig};

pub use alert::{AlertKind, VacancyAlert};
pub use webhook::WebhookNotifier;

/// Delivers a vacancy alert over some outbound channel.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        alert: &VacancyAlert,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification endpoint rejected the alert with HTTP {status}")]
    Rejected { status: u16 },
}

/// Writes alerts to the run log only. Used for dry runs and when no channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, alert: &VacancyAlert) -> Result<(), NotificationError> {
        info!(
            property = %alert.property.id,
            url = %alert.property.url,
            subject = %alert.subject(),
            "vacancy alert (log only)"
        );
        Ok(())
    }
}

/// Notifier chosen at startup from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredNotifier {
    Webhook(WebhookNotifier),
    Log(LogNotifier),
}

impl ConfiguredNotifier {
    /// Webhook when one is configured, log-only otherwise or when `log_only` is set.
    pub fn from_config(
        notify: &NotifyConfig,
        fetch: &FetchConfig,
        log_only: bool,
    ) -> Result<Self, reqwest::Error> {
        match notify.webhook_url.as_deref() {
            Some(endpoint) if !log_only => {
                let client = reqwest::Client::builder()
                    .timeout(fetch.timeout)
                    .user_agent(fetch.user_agent.as_str())
                    .build()?;
                Ok(Self::Webhook(WebhookNotifier::new(client, endpoint)))
            }
            _ => Ok(Self::Log(LogNotifier)),
        }
    }

    pub fn channel(&self) -> &'static str {
        match self {
            ConfiguredNotifier::Webhook(_) => "webhook",
            ConfiguredNotifier::Log(_) => "log",
        }
    }
}

impl Notifier for ConfiguredNotifier {
    async fn notify(&self, alert: &VacancyAlert) -> Result<(), NotificationError> {
        match self {
            ConfiguredNotifier::Webhook(notifier) => notifier.notify(alert).await,
            ConfiguredNotifier::Log(notifier) => notifier.notify(alert).await,
        }
    }
}
