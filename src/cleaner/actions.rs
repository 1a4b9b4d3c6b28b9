use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::classify::{
    directory_not_empty, failure_kind, failure_outcome, missing_path, FailureKind,
};
use super::trash::TrashBin;
use crate::common::CancelToken;
use crate::model::{CleanupOutcome, CleanupVerb, Finding, OutcomeCategory};
use crate::safety::SafetyPolicy;

/// One physical removal verb.
///
/// `execute` must never panic on filesystem errors; every failure is
/// classified into an outcome. `execute_batch` returns one outcome per
/// input, in input order. Once canceled it stops and returns outcomes only
/// for the leading inputs it actually ran.
pub trait CleanupAction: Send + Sync {
    fn verb(&self) -> CleanupVerb;

    fn supports_batch(&self) -> bool;

    fn execute(&self, finding: &Finding, policy: &SafetyPolicy) -> CleanupOutcome;

    /// Default: the single-item call in a loop, stopping at cancellation
    fn execute_batch(
        &self,
        findings: &[Finding],
        policy: &SafetyPolicy,
        cancel: &CancelToken,
    ) -> Vec<CleanupOutcome> {
        findings
            .iter()
            .take_while(|_| !cancel.is_canceled())
            .map(|f| self.execute(f, policy))
            .collect()
    }
}

/// Actions keyed by the verb they implement
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<CleanupVerb, Arc<dyn CleanupAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move-to-trash, permanent delete and empty-trash over `trash`
    pub fn standard(trash: Arc<dyn TrashBin>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MoveToTrashAction::new(Arc::clone(&trash))));
        registry.register(Arc::new(PermanentDeleteAction));
        registry.register(Arc::new(EmptyTrashAction::new(trash)));
        registry
    }

    /// Later registrations for the same verb replace earlier ones
    pub fn register(&mut self, action: Arc<dyn CleanupAction>) {
        self.actions.insert(action.verb(), action);
    }

    pub fn get(&self, verb: CleanupVerb) -> Option<&Arc<dyn CleanupAction>> {
        self.actions.get(&verb)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ─── Move to trash ──────────────────────────────────────────────────────────

pub struct MoveToTrashAction {
    trash: Arc<dyn TrashBin>,
}

impl MoveToTrashAction {
    pub fn new(trash: Arc<dyn TrashBin>) -> Self {
        Self { trash }
    }
}

impl CleanupAction for MoveToTrashAction {
    fn verb(&self) -> CleanupVerb {
        CleanupVerb::MoveToTrash
    }

    fn supports_batch(&self) -> bool {
        false
    }

    fn execute(&self, finding: &Finding, _policy: &SafetyPolicy) -> CleanupOutcome {
        let Some(path) = finding.path.as_deref() else {
            return missing_path(finding);
        };

        let meta = match std::fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) => return failure_outcome(finding, &e),
        };

        if meta.is_dir() {
            match std::fs::read_dir(path) {
                Ok(mut children) => {
                    if children.next().is_some() {
                        return directory_not_empty(finding);
                    }
                }
                Err(e) => {
                    return CleanupOutcome::skipped(
                        finding,
                        format!("Unable to verify directory: {}", e),
                        OutcomeCategory::SkippedOther,
                    );
                }
            }
        }

        match self.trash.send(path) {
            Ok(()) => CleanupOutcome::deleted(finding, "Sent to trash."),
            Err(e) => failure_outcome(finding, &e),
        }
    }
}

// ─── Permanent delete ───────────────────────────────────────────────────────

/// Removes files and empty directories; batches without extra validation
pub struct PermanentDeleteAction;

impl PermanentDeleteAction {
    fn delete(path: &Path) -> std::io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
    }
}

impl CleanupAction for PermanentDeleteAction {
    fn verb(&self) -> CleanupVerb {
        CleanupVerb::PermanentDelete
    }

    fn supports_batch(&self) -> bool {
        true
    }

    fn execute(&self, finding: &Finding, _policy: &SafetyPolicy) -> CleanupOutcome {
        let Some(path) = finding.path.as_deref() else {
            return missing_path(finding);
        };

        match Self::delete(path) {
            Ok(()) => CleanupOutcome::deleted(finding, "Permanently deleted."),
            Err(e) if path.is_dir() && failure_kind(&e) == FailureKind::Locked => {
                directory_not_empty(finding)
            }
            Err(e) => failure_outcome(finding, &e),
        }
    }
}

// ─── Empty trash ────────────────────────────────────────────────────────────

pub struct EmptyTrashAction {
    trash: Arc<dyn TrashBin>,
}

impl EmptyTrashAction {
    pub fn new(trash: Arc<dyn TrashBin>) -> Self {
        Self { trash }
    }
}

impl CleanupAction for EmptyTrashAction {
    fn verb(&self) -> CleanupVerb {
        CleanupVerb::EmptyTrash
    }

    fn supports_batch(&self) -> bool {
        false
    }

    fn execute(&self, finding: &Finding, _policy: &SafetyPolicy) -> CleanupOutcome {
        match self.trash.empty(Some(finding.drive_root.as_str())) {
            Ok(()) => CleanupOutcome::deleted(finding, "Trash emptied."),
            Err(e) => CleanupOutcome::skipped(finding, e.to_string(), OutcomeCategory::SkippedOther),
        }
    }

    fn execute_batch(
        &self,
        findings: &[Finding],
        _policy: &SafetyPolicy,
        _cancel: &CancelToken,
    ) -> Vec<CleanupOutcome> {
        findings
            .iter()
            .map(|f| {
                CleanupOutcome::skipped(
                    f,
                    "Batch trash cleanup is not supported.",
                    OutcomeCategory::SkippedOther,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::trash::StagingTrash;
    use crate::model::Confidence;
    use std::fs;
    use std::path::PathBuf;

    fn finding(path: Option<PathBuf>, verb: CleanupVerb) -> Finding {
        Finding {
            id: "f".into(),
            category_id: "temp.user".into(),
            discoverer_id: "provider.user-temp".into(),
            drive_root: "/".into(),
            path,
            size_bytes: 42,
            last_write: None,
            confidence: Confidence::High,
            reason: String::new(),
            requires_elevation: false,
            requires_app_closed: false,
            verb,
        }
    }

    #[test]
    fn test_standard_registry_has_every_verb() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ActionRegistry::standard(Arc::new(StagingTrash::new(dir.path())));
        assert_eq!(registry.len(), 3);
        assert!(registry.get(CleanupVerb::PermanentDelete).unwrap().supports_batch());
        assert!(!registry.get(CleanupVerb::MoveToTrash).unwrap().supports_batch());
        assert!(!registry.get(CleanupVerb::EmptyTrash).unwrap().supports_batch());
    }

    #[test]
    fn test_permanent_delete_file_and_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.tmp");
        fs::write(&file, b"abc").unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let policy = SafetyPolicy::new();
        let action = PermanentDeleteAction;

        let outcome = action.execute(&finding(Some(file.clone()), CleanupVerb::PermanentDelete), &policy);
        assert!(outcome.success);
        assert_eq!(outcome.bytes_reclaimed, 42);
        assert!(!file.exists());

        let outcome = action.execute(&finding(Some(empty.clone()), CleanupVerb::PermanentDelete), &policy);
        assert!(outcome.success);
        assert!(!empty.exists());
    }

    #[test]
    fn test_permanent_delete_refuses_full_dir() {
        let dir = tempfile::tempdir().unwrap();
        let full = dir.path().join("full");
        fs::create_dir(&full).unwrap();
        fs::write(full.join("child"), b"x").unwrap();

        let outcome = PermanentDeleteAction.execute(
            &finding(Some(full.clone()), CleanupVerb::PermanentDelete),
            &SafetyPolicy::new(),
        );
        assert!(!outcome.success);
        assert_eq!(outcome.category, OutcomeCategory::SkippedLocked);
        assert!(full.join("child").exists());
    }

    #[test]
    fn test_missing_and_gone_paths() {
        let policy = SafetyPolicy::new();
        let outcome = PermanentDeleteAction.execute(&finding(None, CleanupVerb::PermanentDelete), &policy);
        assert_eq!(outcome.message, "Missing path.");
        assert_eq!(outcome.category, OutcomeCategory::SkippedOther);

        let gone = PathBuf::from("/definitely/not/here.tmp");
        let outcome = PermanentDeleteAction.execute(&finding(Some(gone), CleanupVerb::PermanentDelete), &policy);
        assert_eq!(outcome.message, "Path not found.");
    }

    #[test]
    fn test_batch_one_outcome_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        fs::write(&a, b"a").unwrap();
        let findings = vec![
            finding(Some(a), CleanupVerb::PermanentDelete),
            finding(None, CleanupVerb::PermanentDelete),
        ];
        let outcomes = PermanentDeleteAction.execute_batch(&findings, &SafetyPolicy::new(), &CancelToken::new());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
    }

    #[test]
    fn test_canceled_batch_stops_without_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        fs::write(&a, b"a").unwrap();
        let findings = vec![finding(Some(a.clone()), CleanupVerb::PermanentDelete)];

        let cancel = CancelToken::new();
        cancel.cancel();
        let outcomes = PermanentDeleteAction.execute_batch(&findings, &SafetyPolicy::new(), &cancel);
        assert!(outcomes.is_empty());
        assert!(a.exists());
    }

    #[test]
    fn test_move_to_trash_refuses_full_dir() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Arc::new(StagingTrash::new(dir.path().join("trash")));
        let full = dir.path().join("full");
        fs::create_dir(&full).unwrap();
        fs::write(full.join("child"), b"x").unwrap();

        let action = MoveToTrashAction::new(trash);
        let outcome = action.execute(&finding(Some(full), CleanupVerb::MoveToTrash), &SafetyPolicy::new());
        assert_eq!(outcome.message, "Directory not empty; skipped.");
        assert_eq!(outcome.category, OutcomeCategory::SkippedLocked);
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_trash_reports_finding_size() {
        let dir = tempfile::tempdir().unwrap();
        let trash = Arc::new(StagingTrash::new(dir.path().join("trash")));
        let victim = dir.path().join("v");
        fs::write(&victim, b"vvv").unwrap();
        trash.send(&victim).unwrap();

        let action = EmptyTrashAction::new(trash.clone());
        let outcome = action.execute(&finding(Some("/".into()), CleanupVerb::EmptyTrash), &SafetyPolicy::new());
        assert!(outcome.success);
        assert_eq!(outcome.bytes_reclaimed, 42);
        assert_eq!(trash.query(None).unwrap().items, 0);
    }
}
