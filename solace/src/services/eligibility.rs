use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;

use tracing::warn;

/// Count-based policy gate for advice generation.
///
/// Tracks notes since the most recent advice, independently of the memory
/// batching counter over the same note stream.
#[derive(Clone)]
pub struct EligibilityGate {
    db: Arc<dyn DatabaseBackend>,
    threshold: u32,
}

impl EligibilityGate {
    pub fn new(db: Arc<dyn DatabaseBackend>, config: &PipelineConfig) -> Self {
        Self {
            db,
            threshold: config.advice_note_threshold,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether a new advice run should happen. Never raises: any read
    /// error logs a warning and reports not-eligible (fail closed).
    pub async fn is_eligible(&self, user_id: &str) -> bool {
        match self.check(user_id).await {
            Ok(eligible) => eligible,
            Err(e) => {
                warn!(user_id, error = %e, "Eligibility check failed, reporting not eligible");
                false
            }
        }
    }

    async fn check(&self, user_id: &str) -> Result<bool> {
        let since = self
            .db
            .latest_advice(user_id)
            .await?
            .map(|advice| advice.created_at);

        let count = self.db.count_notes_since(user_id, since).await?;
        Ok(count >= self.threshold as u64)
    }
}
