mod advice;
mod classify;
mod context;
mod eligibility;
mod locks;
mod memory;

pub use advice::{AdviceJobManager, AdviceService};
pub use classify::ClassificationManager;
pub use context::ContextBuilder;
pub use eligibility::EligibilityGate;
pub use locks::UserLocks;
pub use memory::MemoryService;
