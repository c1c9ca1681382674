//! Workflow Notifier
//!
//! Best-effort event logging to an automation webhook. Every robot event is
//! posted as
//!
//! ```json
//! {"event_type": "speech", "mode": "kid", "data": {...}, "robot": "Kali"}
//! ```
//!
//! to `<base_url>/webhook/<workflow>`. Failures are logged and never reach
//! the caller.

mod webhook;

use async_trait::async_trait;

use crate::mode::OperationalMode;

pub use webhook::WebhookNotifier;

/// Fire-and-forget event sink
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    /// Whether events go anywhere at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Probe the endpoint; only the log line depends on the answer
    async fn check_connection(&self) -> bool;

    /// Post one event, swallowing any failure
    async fn notify(&self, event_type: &str, mode: OperationalMode, data: serde_json::Value);
}
