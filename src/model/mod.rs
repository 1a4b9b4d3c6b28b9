pub mod category;
pub mod finding;
pub mod outcome;

pub use category::{Category, RiskLevel};
pub use finding::{apply_cleanup_decision, CleanupVerb, Confidence, Finding};
pub use outcome::{CleanupOutcome, CleanupProgress, CleanupSummary, OutcomeCategory};
