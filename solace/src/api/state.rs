use std::sync::Arc;

use crate::classifier::ClassifierProvider;
use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::identity::IdentityProvider;
use crate::llm::LlmProvider;
use crate::services::{AdviceService, EligibilityGate, UserLocks};

/// Shared application state.
///
/// Every provider and service is constructed once here and passed in
/// explicitly; nothing reaches for a global client handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub classifier: ClassifierProvider,
    pub llm: LlmProvider,
    pub identity: IdentityProvider,
    pub advice: AdviceService,
    pub eligibility: EligibilityGate,
    pub locks: UserLocks,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn DatabaseBackend>,
        classifier: ClassifierProvider,
        llm: LlmProvider,
        identity: IdentityProvider,
    ) -> Self {
        let config = Arc::new(config);
        let locks = UserLocks::new();
        let advice = AdviceService::new(db.clone(), llm.clone(), &config.pipeline, locks.clone());
        let eligibility = EligibilityGate::new(db.clone(), &config.pipeline);

        Self {
            config,
            db,
            classifier,
            llm,
            identity,
            advice,
            eligibility,
            locks,
        }
    }
}
