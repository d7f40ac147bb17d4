use std::time::Duration;

use serde_json::{json, Value};

use crate::config::ClassifierConfig;
use crate::error::{Result, SolaceError};
use crate::models::{Emotion, EmotionVector};

use super::provider::ClassifyOutcome;

/// HTTP client for a Hugging Face style text-classification endpoint.
///
/// Request: `{"inputs": "<text>"}`. Response: a nested list of
/// `{"label": ..., "score": ...}` objects, or `{"error": "..."}` while the
/// model is still loading.
pub struct ClassifierApiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    max_input_chars: usize,
}

impl ClassifierApiClient {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                SolaceError::Classifier(format!("Failed to create classifier HTTP client: {error}"))
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            max_input_chars: config.max_input_chars,
        })
    }

    pub async fn classify(&self, text: &str) -> ClassifyOutcome {
        if text.trim().is_empty() {
            return ClassifyOutcome::Failed("Cannot classify empty text".to_string());
        }

        let truncated: String = text.chars().take(self.max_input_chars).collect();

        let response = match self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": truncated }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) if error.is_timeout() || error.is_connect() => {
                return ClassifyOutcome::Retry(format!("Classifier request failed: {error}"));
            }
            Err(error) => {
                return ClassifyOutcome::Failed(format!("Classifier request failed: {error}"));
            }
        };

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return ClassifyOutcome::Retry(format!(
                "Classifier returned retryable status {status}"
            ));
        }
        if !status.is_success() {
            return ClassifyOutcome::Failed(format!("Classifier returned status {status}"));
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(error) => {
                return ClassifyOutcome::Failed(format!(
                    "Classifier response was not valid JSON: {error}"
                ));
            }
        };

        parse_classifier_payload(&payload)
    }
}

/// Normalize the upstream payload into an [`EmotionVector`].
///
/// Labels outside the supported set are discarded; labels the service did
/// not return default to 0.0; every score is rounded to 3 decimals and
/// clamped to [0, 1]. A response with only unsupported labels is a
/// permanent failure.
pub fn parse_classifier_payload(payload: &Value) -> ClassifyOutcome {
    if let Some(error) = payload.get("error").and_then(Value::as_str) {
        let lowered = error.to_lowercase();
        if lowered.contains("loading") || lowered.contains("warming") {
            return ClassifyOutcome::Retry(format!("Classifier model not ready: {error}"));
        }
        return ClassifyOutcome::Failed(format!("Classifier error: {error}"));
    }

    // Either [[{label, score}, ...]] or a flat [{label, score}, ...].
    let entries = match payload.as_array() {
        Some(outer) => match outer.first() {
            Some(Value::Array(inner)) => inner.as_slice(),
            Some(Value::Object(_)) => outer.as_slice(),
            _ => {
                return ClassifyOutcome::Failed(
                    "Classifier response contained no predictions".to_string(),
                );
            }
        },
        None => {
            return ClassifyOutcome::Failed(format!(
                "Unexpected classifier response shape: {payload}"
            ));
        }
    };

    let mut vector = EmotionVector::default();
    let mut matched = 0usize;

    for entry in entries {
        let (Some(label), Some(score)) = (
            entry.get("label").and_then(Value::as_str),
            entry.get("score").and_then(Value::as_f64),
        ) else {
            return ClassifyOutcome::Failed(format!(
                "Malformed prediction object in classifier response: {entry}"
            ));
        };

        let Ok(emotion) = label.to_lowercase().parse::<Emotion>() else {
            continue;
        };
        vector.set(emotion, score.clamp(0.0, 1.0));
        matched += 1;
    }

    if matched == 0 {
        return ClassifyOutcome::Failed(
            "Classifier response contained no supported labels".to_string(),
        );
    }

    ClassifyOutcome::Scored(vector.rounded())
}
