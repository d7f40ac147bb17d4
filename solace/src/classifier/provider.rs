use std::sync::Arc;

use crate::config::ClassifierConfig;
use crate::models::EmotionVector;

use super::api::ClassifierApiClient;

/// Outcome of one classification attempt.
///
/// The adapter never signals retries through errors: the caller owns the
/// retry loop and backoff, so the distinction between "try again later"
/// and "give up and fall back" is part of the return type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    /// Normalized scores for all seven labels.
    Scored(EmotionVector),
    /// Transient upstream condition (model warming up, network, 5xx).
    Retry(String),
    /// Permanent failure (bad input, malformed or unusable response).
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierBackend {
    Inference { url: String },
    Unavailable { reason: String },
}

/// Adapter around the external emotion classification service.
#[derive(Debug, Clone)]
pub struct ClassifierProvider {
    backend: ClassifierBackend,
    config: Option<Arc<ClassifierConfig>>,
}

impl ClassifierProvider {
    pub fn new(config: Option<&ClassifierConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No classifier configuration provided");
        };

        Self {
            backend: ClassifierBackend::Inference {
                url: config.url.clone(),
            },
            config: Some(Arc::new(config.clone())),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: ClassifierBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, ClassifierBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &ClassifierBackend {
        &self.backend
    }

    /// Retry budget for transient failures before the neutral fallback.
    pub fn max_retries(&self) -> u32 {
        self.config.as_deref().map(|c| c.max_retries).unwrap_or(0)
    }

    /// Fixed delay before a re-queued attempt becomes due.
    pub fn retry_delay_secs(&self) -> u64 {
        self.config
            .as_deref()
            .map(|c| c.retry_delay_secs)
            .unwrap_or(45)
    }

    pub async fn classify(&self, text: &str) -> ClassifyOutcome {
        let Some(config) = self.config.as_deref() else {
            // An unconfigured classifier is a permanent condition: the
            // caller falls back so notes still reach a terminal state.
            return ClassifyOutcome::Failed(self.unavailable_reason());
        };

        let client = match ClassifierApiClient::new(config) {
            Ok(client) => client,
            Err(e) => return ClassifyOutcome::Failed(format!("Classifier client error: {e}")),
        };

        client.classify(text).await
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            ClassifierBackend::Unavailable { reason } => reason.clone(),
            _ => "Classifier not configured".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_provider_fails_permanently() {
        let provider = ClassifierProvider::unavailable("no api key");
        assert!(!provider.is_available());
        match provider.classify("some text").await {
            ClassifyOutcome::Failed(reason) => assert!(reason.contains("no api key")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn provider_from_config_is_available() {
        let config = crate::config::ClassifierConfig {
            url: "https://classifier.example/models/emotion".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_secs: 45,
            max_input_chars: 500,
        };
        let provider = ClassifierProvider::new(Some(&config));
        assert!(provider.is_available());
        assert_eq!(provider.max_retries(), 3);
        assert_eq!(provider.retry_delay_secs(), 45);
    }
}
