//! HTTP webhook notifier

use async_trait::async_trait;
use serde_json::{json, Value};

use super::WorkflowNotifier;
use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::mode::OperationalMode;

/// Posts events to `<base_url>/webhook/<workflow>`
#[derive(Clone)]
pub struct WebhookNotifier {
    /// `None` disables every call
    base_url: Option<String>,
    workflow: String,
    robot_name: String,
    webhook_key: Option<String>,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create from the notifier section of the configuration
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            workflow: config.workflow.clone(),
            robot_name: config.robot_name.clone(),
            webhook_key: config.webhook_key.clone(),
            http_client,
        })
    }

    /// A notifier that never sends anything
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            base_url: None,
            workflow: String::new(),
            robot_name: String::new(),
            webhook_key: None,
            http_client: reqwest::Client::new(),
        }
    }

    /// Webhook URL for `workflow`
    fn webhook_url(&self, workflow: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{base}/webhook/{workflow}"))
    }

    /// Event body sent to the logging workflow
    #[must_use]
    pub fn event_payload(&self, event_type: &str, mode: OperationalMode, data: Value) -> Value {
        json!({
            "event_type": event_type,
            "mode": mode,
            "data": data,
            "robot": self.robot_name,
        })
    }

    /// POST `data` to the named workflow and return its JSON answer
    ///
    /// An empty 200 body yields [`Value::Null`].
    ///
    /// # Errors
    ///
    /// - [`NotifyError::Disabled`] without a base URL
    /// - [`NotifyError::Http`] on transport failure or timeout
    /// - [`NotifyError::Status`] for any status other than 200
    /// - [`NotifyError::Decode`] for a non-JSON 200 body
    pub async fn trigger_workflow(&self, workflow: &str, data: &Value) -> Result<Value, NotifyError> {
        let url = self.webhook_url(workflow).ok_or(NotifyError::Disabled)?;

        let mut request = self.http_client.post(&url).json(data);
        if let Some(ref key) = self.webhook_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(NotifyError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let result = serde_json::from_str(&body)?;

        tracing::info!(workflow, "Workflow triggered");
        Ok(result)
    }
}

#[async_trait]
impl WorkflowNotifier for WebhookNotifier {
    fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    async fn check_connection(&self) -> bool {
        let Some(ref base) = self.base_url else {
            return false;
        };
        match self.http_client.get(base).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                tracing::info!(url = %base, "Workflow endpoint reachable");
                true
            }
            Ok(response) => {
                tracing::warn!(url = %base, status = response.status().as_u16(), "Workflow endpoint returned unexpected status");
                false
            }
            Err(e) => {
                tracing::warn!(url = %base, error = %e, "Workflow endpoint unreachable");
                false
            }
        }
    }

    async fn notify(&self, event_type: &str, mode: OperationalMode, data: Value) {
        if !self.is_enabled() {
            tracing::debug!(event_type, "Notifier disabled, event dropped");
            return;
        }

        let payload = self.event_payload(event_type, mode, data);
        match self.trigger_workflow(&self.workflow, &payload).await {
            Ok(_) => tracing::debug!(event_type, mode = %mode, "Event logged"),
            Err(e) => tracing::warn!(event_type, error = %e, "Failed to log event"),
        }
    }
}
