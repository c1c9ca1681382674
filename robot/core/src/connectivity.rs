//! Connectivity Checks
//!
//! Reachability probes for the external services the robot depends on.
//! Used by `kali-check connectivity` before a robot is deployed.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::RobotConfig;

/// Timeout for a single probe
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A named URL to probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityTarget {
    /// Human name shown in reports
    pub name: String,
    /// URL probed with a HEAD request
    pub url: String,
}

impl ConnectivityTarget {
    /// Create a target
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Outcome of probing one target
#[derive(Clone, Debug)]
pub struct TargetReport {
    /// The probed target
    pub target: ConnectivityTarget,
    /// HTTP status, if a response arrived
    pub status: Option<u16>,
    /// Transport error, if no response arrived
    pub error: Option<String>,
    /// Round-trip time
    pub elapsed: Duration,
}

impl TargetReport {
    /// Reachable means any response below 400
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.status.is_some_and(|s| s < 400)
    }

    /// One-line summary for terminal output
    #[must_use]
    pub fn summary(&self) -> String {
        let mark = if self.is_reachable() { "ok  " } else { "FAIL" };
        let detail = match (self.status, &self.error) {
            (Some(status), _) => format!("HTTP {status}"),
            (None, Some(err)) => err.clone(),
            (None, None) => "no response".to_string(),
        };
        format!(
            "[{mark}] {:<20} {} ({detail}, {} ms)",
            self.target.name,
            self.target.url,
            self.elapsed.as_millis()
        )
    }
}

/// Targets derived from the configuration, followed by configured extras
#[must_use]
pub fn default_targets(config: &RobotConfig) -> Vec<ConnectivityTarget> {
    let mut targets = Vec::new();
    if let Some(ref base) = config.notifier.base_url {
        targets.push(ConnectivityTarget::new("Workflow automation", base.clone()));
    }
    let speech = config.voice.speech_endpoint();
    let speech_host = reqwest::Url::parse(&speech)
        .ok()
        .and_then(|url| url.host_str().map(|host| format!("{}://{host}", url.scheme())))
        .unwrap_or(speech);
    targets.push(ConnectivityTarget::new("Speech synthesis", speech_host));
    targets.extend(config.connectivity_targets.iter().cloned());
    targets
}

/// Probe one target with a HEAD request
pub async fn check_target(client: &reqwest::Client, target: &ConnectivityTarget) -> TargetReport {
    let started = Instant::now();
    let result = client
        .head(&target.url)
        .timeout(CHECK_TIMEOUT)
        .send()
        .await;
    let elapsed = started.elapsed();

    match result {
        Ok(response) => {
            let status = response.status().as_u16();
            tracing::debug!(target_name = %target.name, status, "Connectivity probe answered");
            TargetReport {
                target: target.clone(),
                status: Some(status),
                error: None,
                elapsed,
            }
        }
        Err(e) => {
            tracing::debug!(target_name = %target.name, error = %e, "Connectivity probe failed");
            TargetReport {
                target: target.clone(),
                status: None,
                error: Some(e.to_string()),
                elapsed,
            }
        }
    }
}

/// Probe every target in order
pub async fn check_all(
    client: &reqwest::Client,
    targets: &[ConnectivityTarget],
) -> Vec<TargetReport> {
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        reports.push(check_target(client, target).await);
    }
    reports
}
