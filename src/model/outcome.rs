use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::finding::{CleanupVerb, Finding};

/// Closed classification of why a finding was or wasn't removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeCategory {
    #[serde(rename = "deleted")]
    Deleted,
    /// Sharing/lock violation or non-empty directory
    #[serde(rename = "skipped.locked")]
    SkippedLocked,
    #[serde(rename = "skipped.access")]
    SkippedAccessDenied,
    /// Retention window or recent-file guard
    #[serde(rename = "skipped.too-new")]
    SkippedTooNew,
    #[serde(rename = "skipped.compatibility")]
    SkippedCompatibility,
    /// Allow-list, protected-path or missing-data failures
    #[serde(rename = "skipped.safety")]
    SkippedSafetyRecheck,
    #[serde(rename = "skipped.other")]
    SkippedOther,
}

impl OutcomeCategory {
    pub fn id(&self) -> &'static str {
        match self {
            OutcomeCategory::Deleted => "deleted",
            OutcomeCategory::SkippedLocked => "skipped.locked",
            OutcomeCategory::SkippedAccessDenied => "skipped.access",
            OutcomeCategory::SkippedTooNew => "skipped.too-new",
            OutcomeCategory::SkippedCompatibility => "skipped.compatibility",
            OutcomeCategory::SkippedSafetyRecheck => "skipped.safety",
            OutcomeCategory::SkippedOther => "skipped.other",
        }
    }
}

impl std::fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeCategory::Deleted => write!(f, "Deleted"),
            OutcomeCategory::SkippedLocked => write!(f, "In use"),
            OutcomeCategory::SkippedAccessDenied => write!(f, "Access denied"),
            OutcomeCategory::SkippedTooNew => write!(f, "Too new"),
            OutcomeCategory::SkippedCompatibility => write!(f, "Compatibility guard"),
            OutcomeCategory::SkippedSafetyRecheck => write!(f, "Failed safety recheck"),
            OutcomeCategory::SkippedOther => write!(f, "Other"),
        }
    }
}

/// Result of processing one selected finding. Emitted exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupOutcome {
    pub finding_id: String,
    pub success: bool,
    pub message: String,
    /// Zero unless `success`
    pub bytes_reclaimed: u64,
    pub category: OutcomeCategory,
}

impl CleanupOutcome {
    pub fn deleted(finding: &Finding, message: impl Into<String>) -> Self {
        Self {
            finding_id: finding.id.clone(),
            success: true,
            message: message.into(),
            bytes_reclaimed: finding.size_bytes,
            category: OutcomeCategory::Deleted,
        }
    }

    pub fn skipped(
        finding: &Finding,
        message: impl Into<String>,
        category: OutcomeCategory,
    ) -> Self {
        Self {
            finding_id: finding.id.clone(),
            success: false,
            message: message.into(),
            bytes_reclaimed: 0,
            category,
        }
    }
}

/// Counters published while a cleanup runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupProgress {
    pub processed: usize,
    pub total: usize,
    pub deleted: usize,
    pub skipped: usize,
}

impl CleanupProgress {
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Roll-up of a finished cleanup for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    pub deleted: usize,
    pub deleted_bytes: u64,
    pub deleted_to_trash: usize,
    pub deleted_permanently: usize,
    pub skipped: usize,
    pub skipped_bytes: u64,
    pub in_use: usize,
    pub access_denied: usize,
    /// Too new, compatibility guard and failed safety recheck
    pub too_new: usize,
    pub other: usize,
}

impl CleanupSummary {
    pub fn from_outcomes(outcomes: &[CleanupOutcome], findings: &[Finding]) -> Self {
        let by_id: HashMap<&str, &Finding> =
            findings.iter().map(|f| (f.id.as_str(), f)).collect();
        let mut summary = CleanupSummary::default();

        for outcome in outcomes {
            let finding = by_id.get(outcome.finding_id.as_str());
            if outcome.success {
                summary.deleted += 1;
                summary.deleted_bytes += outcome.bytes_reclaimed;
                if finding.is_some_and(|f| f.verb == CleanupVerb::MoveToTrash) {
                    summary.deleted_to_trash += 1;
                } else {
                    summary.deleted_permanently += 1;
                }
                continue;
            }

            summary.skipped += 1;
            summary.skipped_bytes += finding.map(|f| f.size_bytes).unwrap_or(0);
            match outcome.category {
                OutcomeCategory::SkippedLocked => summary.in_use += 1,
                OutcomeCategory::SkippedAccessDenied => summary.access_denied += 1,
                OutcomeCategory::SkippedTooNew
                | OutcomeCategory::SkippedCompatibility
                | OutcomeCategory::SkippedSafetyRecheck => summary.too_new += 1,
                _ => summary.other += 1,
            }
        }

        summary
    }
}
