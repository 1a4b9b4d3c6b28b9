pub mod discoverers;
pub mod walker;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::common::errors::ScanError;
use crate::common::CancelToken;
use crate::model::{Category, Finding};
use crate::safety::SafetyPolicy;

pub use discoverers::default_discoverers;

/// Scans one content category and emits findings.
///
/// A discoverer must register every root it emits findings under via
/// [`SafetyPolicy::add_allowlist`] before emitting them. A component that
/// simply isn't installed yields an empty list, not an error.
pub trait Discoverer: Send + Sync {
    fn id(&self) -> &str;

    fn category(&self) -> &'static Category;

    fn scan(
        &self,
        policy: &mut SafetyPolicy,
        cancel: &CancelToken,
    ) -> Result<Vec<Finding>, ScanError>;
}

/// Everything one scan produced. Replaced wholesale by the next scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResults {
    /// In discovery order
    pub findings: Vec<Finding>,
    pub total_by_category: BTreeMap<String, u64>,
    pub total_by_drive: BTreeMap<String, u64>,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    /// Policy warnings accumulated during the scan
    pub warnings: Vec<String>,
}

impl ScanResults {
    pub fn total_bytes(&self) -> u64 {
        self.findings.iter().map(|f| f.size_bytes).sum()
    }

    pub fn bytes_for_category(&self, category_id: &str) -> u64 {
        lookup_ignore_case(&self.total_by_category, category_id)
    }

    pub fn bytes_for_drive(&self, drive_root: &str) -> u64 {
        lookup_ignore_case(&self.total_by_drive, drive_root)
    }

    pub fn find(&self, finding_id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == finding_id)
    }
}

/// Run each discoverer in turn and collect their findings.
///
/// A failing discoverer becomes a policy warning and the scan moves on.
/// Cancellation is checked before every discoverer and aborts the rest.
/// Does not reset the policy; callers start a new scan generation with
/// [`SafetyPolicy::reset_for_scan`] first.
pub fn run_scan(
    discoverers: &[Box<dyn Discoverer>],
    policy: &mut SafetyPolicy,
    cancel: &CancelToken,
) -> Result<ScanResults, ScanError> {
    let start = Instant::now();
    let timestamp = Utc::now();
    let mut findings = Vec::new();

    for discoverer in discoverers {
        if cancel.is_canceled() {
            return Err(ScanError::Canceled);
        }

        let _span = tracing::debug_span!("discoverer", id = discoverer.id()).entered();
        match discoverer.scan(policy, cancel) {
            Ok(found) => {
                tracing::debug!(count = found.len(), "discoverer finished");
                findings.extend(found);
            }
            Err(ScanError::Canceled) => return Err(ScanError::Canceled),
            Err(e) => {
                tracing::warn!(error = %e, "discoverer failed");
                policy.report_warning(format!("{} scan failed: {}", discoverer.id(), e));
            }
        }
    }

    let mut total_by_category = BTreeMap::new();
    let mut total_by_drive = BTreeMap::new();
    for finding in &findings {
        add_total(&mut total_by_category, &finding.category_id, finding.size_bytes);
        add_total(&mut total_by_drive, &finding.drive_root, finding.size_bytes);
    }

    let results = ScanResults {
        findings,
        total_by_category,
        total_by_drive,
        timestamp,
        duration_secs: start.elapsed().as_secs_f64(),
        warnings: policy.warnings(),
    };

    tracing::info!(
        findings = results.findings.len(),
        bytes = results.total_bytes(),
        warnings = results.warnings.len(),
        "scan complete"
    );

    Ok(results)
}

/// Group case-insensitively, keeping the first spelling seen
fn add_total(totals: &mut BTreeMap<String, u64>, key: &str, size: u64) {
    let existing = totals
        .keys()
        .find(|k| k.to_lowercase() == key.to_lowercase())
        .cloned();
    let entry = totals.entry(existing.unwrap_or_else(|| key.to_string())).or_insert(0);
    *entry = entry.saturating_add(size);
}

fn lookup_ignore_case(totals: &BTreeMap<String, u64>, key: &str) -> u64 {
    totals
        .iter()
        .find(|(k, _)| k.to_lowercase() == key.to_lowercase())
        .map(|(_, v)| *v)
        .unwrap_or(0)
}
