//! Amazon Polly Synthesizer
//!
//! Calls the Polly REST API directly:
//!
//! ```text
//! POST https://polly.<region>.amazonaws.com/v1/speech
//! {"Engine":"neural","OutputFormat":"mp3","Text":"...","VoiceId":"Joanna"}
//! ```
//!
//! The request is SigV4 signed with static credentials from the
//! environment; the response body is the encoded audio.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::sigv4::{sign_post, SigningRequest};
use super::traits::{SpeechSynthesizer, SynthesisRequest};
use crate::config::{AwsCredentials, VoiceConfig};
use crate::error::VoiceError;

const SERVICE: &str = "polly";

/// Polly-backed synthesizer
pub struct PollySynthesizer {
    region: String,
    endpoint: String,
    credentials: Option<AwsCredentials>,
    timeout: Duration,
    /// Built by `initialize`
    http_client: RwLock<Option<reqwest::Client>>,
}

impl PollySynthesizer {
    /// Create from the voice section of the configuration
    #[must_use]
    pub fn from_config(config: &VoiceConfig) -> Self {
        Self {
            region: config.region.clone(),
            endpoint: config.speech_endpoint(),
            credentials: config.credentials.clone(),
            timeout: config.timeout,
            http_client: RwLock::new(None),
        }
    }

    /// Endpoint requests are sent to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn synthesis_error(request: &SynthesisRequest, reason: impl Into<String>) -> VoiceError {
        VoiceError::Synthesis {
            voice: request.voice_id.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    fn name(&self) -> &'static str {
        "Polly"
    }

    async fn initialize(&self) -> Result<(), VoiceError> {
        if self.credentials.is_none() {
            return Err(VoiceError::Initialization(
                "AWS credentials not set (AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY)".into(),
            ));
        }
        reqwest::Url::parse(&self.endpoint).map_err(|e| {
            VoiceError::Initialization(format!("invalid speech endpoint {}: {e}", self.endpoint))
        })?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| VoiceError::Initialization(format!("HTTP client: {e}")))?;
        *self.http_client.write() = Some(client);

        tracing::info!(region = %self.region, endpoint = %self.endpoint, "Polly client ready");
        Ok(())
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, VoiceError> {
        let client = self
            .http_client
            .read()
            .clone()
            .ok_or(VoiceError::NotInitialized)?;
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(VoiceError::NotInitialized)?;

        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| Self::synthesis_error(request, e.to_string()))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(Self::synthesis_error(request, "endpoint has no host")),
        };

        let body = serde_json::json!({
            "Engine": request.engine,
            "OutputFormat": request.output_format,
            "Text": request.text,
            "VoiceId": request.voice_id,
        })
        .to_string();

        let signed = sign_post(
            &SigningRequest {
                host: &host,
                path: url.path(),
                region: &self.region,
                service: SERVICE,
                payload: body.as_bytes(),
                timestamp: chrono::Utc::now(),
            },
            credentials,
        )
        .map_err(|e| Self::synthesis_error(request, format!("signing: {e}")))?;

        let mut builder = client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-amz-date", &signed.amz_date)
            .header(reqwest::header::AUTHORIZATION, &signed.authorization)
            .body(body);
        if let Some(ref token) = signed.security_token {
            builder = builder.header("x-amz-security-token", token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::synthesis_error(request, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Self::synthesis_error(
                request,
                format!("HTTP {}: {}", status.as_u16(), detail.trim()),
            ));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Self::synthesis_error(request, e.to_string()))?;
        if audio.is_empty() {
            return Err(Self::synthesis_error(request, "empty audio stream"));
        }

        tracing::debug!(voice = %request.voice_id, bytes = audio.len(), "Speech synthesized");
        Ok(audio.to_vec())
    }
}
