use serde::Serialize;
use tracing::debug;

use super::{AlertKind, NotificationError, Notifier, VacancyAlert};

/// Posts alerts as JSON to a chat webhook (Slack/Discord/LINE style relay).
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    subject: String,
    text: String,
    url: &'a str,
    property: &'a str,
    kind: AlertKind,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &VacancyAlert) -> Result<(), NotificationError> {
        let payload = WebhookPayload {
            subject: alert.subject(),
            text: alert.body(),
            url: &alert.property.url,
            property: alert.property.id.as_str(),
            kind: alert.kind,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(property = %alert.property.id, "webhook accepted alert");
        Ok(())
    }
}
