use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::actions::ActionRegistry;
use super::progress::{with_aggregator, ProgressSink};
use crate::common::errors::{CanceledCleanup, CleanupError};
use crate::common::CancelToken;
use crate::model::{CleanupOutcome, CleanupVerb, Finding, OutcomeCategory};
use crate::safety::{validate, SafetyPolicy};

/// Lower and upper bound on concurrent per-item deletes
pub const MIN_WORKERS: usize = 2;
pub const MAX_WORKERS: usize = 6;

/// Runs cleanups: batch when possible, otherwise per item on a bounded pool.
///
/// Every finding is re-validated against the live filesystem immediately
/// before its action runs. Each selected finding gets exactly one outcome
/// unless the run is canceled, in which case findings that never started
/// have none.
pub struct CleanupEngine {
    registry: ActionRegistry,
    worker_limit: Option<usize>,
}

/// How a batch attempt ended
enum BatchAttempt {
    /// Mixed verbs, empty-trash, or no batch-capable action
    Ineligible,
    /// The action returned the wrong number of outcomes
    Abandoned,
    /// Stopped early; holds outcomes only for findings that were processed
    Canceled(Vec<CleanupOutcome>),
    Done(Vec<CleanupOutcome>),
}

/// How the dispatch finished, before progress is attached
enum Run {
    Complete(Vec<CleanupOutcome>),
    Canceled(Vec<CleanupOutcome>),
}

impl CleanupEngine {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            worker_limit: None,
        }
    }

    /// Fix the worker count instead of deriving it from the host
    pub fn with_worker_limit(mut self, workers: usize) -> Self {
        self.worker_limit = Some(workers.max(1));
        self
    }

    /// Configured limit, or host parallelism clamped to 2..=6
    pub fn worker_count(&self) -> usize {
        self.worker_limit.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(MIN_WORKERS)
                .clamp(MIN_WORKERS, MAX_WORKERS)
        })
    }

    /// Clean the findings whose ids are in `selected_ids`.
    ///
    /// Outcomes follow the order of `findings`. Cancellation yields
    /// [`CleanupError::Canceled`] carrying whatever finished.
    pub fn execute<S>(
        &self,
        findings: &[Finding],
        selected_ids: &[String],
        policy: &SafetyPolicy,
        cancel: &CancelToken,
        progress: &mut S,
    ) -> Result<Vec<CleanupOutcome>, CleanupError>
    where
        S: ProgressSink + ?Sized,
    {
        let wanted: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
        let selected: Vec<&Finding> = findings
            .iter()
            .filter(|f| wanted.contains(f.id.as_str()))
            .collect();

        if selected.is_empty() {
            return Ok(Vec::new());
        }
        if policy.allowlist_is_empty() {
            tracing::warn!("no scan roots registered; every finding will fail its safety recheck");
        }

        let total = selected.len();
        let (run, last) = with_aggregator(total, progress, |tx| self.dispatch(&selected, policy, cancel, tx));

        match run? {
            Run::Complete(outcomes) => {
                let deleted = outcomes.iter().filter(|o| o.success).count();
                tracing::info!(total, deleted, skipped = total - deleted, "cleanup complete");
                Ok(outcomes)
            }
            Run::Canceled(outcomes) => {
                tracing::info!(processed = last.processed, total, "cleanup canceled");
                Err(CleanupError::Canceled(CanceledCleanup {
                    outcomes,
                    progress: last,
                }))
            }
        }
    }

    fn dispatch(
        &self,
        selected: &[&Finding],
        policy: &SafetyPolicy,
        cancel: &CancelToken,
        tx: &Sender<bool>,
    ) -> Result<Run, CleanupError> {
        match self.try_batch(selected, policy, cancel) {
            BatchAttempt::Done(outcomes) => {
                for outcome in &outcomes {
                    let _ = tx.send(outcome.success);
                }
                if cancel.is_canceled() {
                    return Ok(Run::Canceled(outcomes));
                }
                return Ok(Run::Complete(outcomes));
            }
            BatchAttempt::Canceled(outcomes) => {
                for outcome in &outcomes {
                    let _ = tx.send(outcome.success);
                }
                return Ok(Run::Canceled(outcomes));
            }
            BatchAttempt::Abandoned | BatchAttempt::Ineligible => {}
        }

        let workers = self.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("reclaim-clean-{}", i))
            .build()?;
        tracing::debug!(workers, items = selected.len(), "per-item cleanup");

        // Each item writes only its own slot; order is preserved by collect
        let slots: Vec<Option<CleanupOutcome>> = pool.install(|| {
            selected
                .par_iter()
                .map(|finding| {
                    if cancel.is_canceled() {
                        return None;
                    }
                    let outcome = self.execute_one(finding, policy);
                    let _ = tx.send(outcome.success);
                    Some(outcome)
                })
                .collect()
        });

        if slots.iter().any(Option::is_none) {
            return Ok(Run::Canceled(slots.into_iter().flatten().collect()));
        }
        Ok(Run::Complete(slots.into_iter().flatten().collect()))
    }

    /// Validate sequentially, then hand every accepted finding to the
    /// action's batch call in one go
    fn try_batch(&self, selected: &[&Finding], policy: &SafetyPolicy, cancel: &CancelToken) -> BatchAttempt {
        let Some(first) = selected.first() else {
            return BatchAttempt::Done(Vec::new());
        };
        let verb = first.verb;
        if verb == CleanupVerb::EmptyTrash || selected.iter().any(|f| f.verb != verb) {
            return BatchAttempt::Ineligible;
        }
        let Some(action) = self.registry.get(verb).filter(|a| a.supports_batch()) else {
            return BatchAttempt::Ineligible;
        };

        let mut slots: Vec<Option<CleanupOutcome>> = Vec::with_capacity(selected.len());
        let mut validated: Vec<Finding> = Vec::new();

        for finding in selected {
            if cancel.is_canceled() {
                return BatchAttempt::Canceled(Vec::new());
            }
            match rejection(finding, policy) {
                Some(outcome) => slots.push(Some(outcome)),
                None => {
                    validated.push((*finding).clone());
                    slots.push(None);
                }
            }
        }

        if validated.is_empty() {
            return BatchAttempt::Done(slots.into_iter().flatten().collect());
        }

        let batch = action.execute_batch(&validated, policy, cancel);

        // A canceled batch may stop short; what it returned did happen
        if cancel.is_canceled() && batch.len() <= validated.len() {
            return BatchAttempt::Canceled(merge_slots(slots, batch));
        }

        if batch.len() != validated.len() {
            tracing::warn!(
                verb = %verb,
                expected = validated.len(),
                returned = batch.len(),
                "batch action misreported outcome count, falling back to per-item cleanup"
            );
            return BatchAttempt::Abandoned;
        }

        BatchAttempt::Done(merge_slots(slots, batch))
    }

    /// Validate one finding and run its action
    fn execute_one(&self, finding: &Finding, policy: &SafetyPolicy) -> CleanupOutcome {
        let Some(action) = self.registry.get(finding.verb) else {
            return CleanupOutcome::skipped(
                finding,
                "No cleanup action registered.",
                OutcomeCategory::SkippedOther,
            );
        };

        if let Some(outcome) = rejection(finding, policy) {
            return outcome;
        }

        catch_unwind(AssertUnwindSafe(|| action.execute(finding, policy))).unwrap_or_else(|_| {
            tracing::warn!(finding = %finding.id, "cleanup action panicked");
            CleanupOutcome::skipped(finding, "Cleanup action failed.", OutcomeCategory::SkippedOther)
        })
    }
}

/// Fill the open slots in order from `batch`; slots left over stay empty
fn merge_slots(slots: Vec<Option<CleanupOutcome>>, batch: Vec<CleanupOutcome>) -> Vec<CleanupOutcome> {
    let mut batch = batch.into_iter();
    slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| batch.next()))
        .collect()
}

/// Outcome for a finding that fails its safety recheck, if it does
fn rejection(finding: &Finding, policy: &SafetyPolicy) -> Option<CleanupOutcome> {
    let check = validate(finding, policy);
    if check.ok {
        return None;
    }
    tracing::debug!(finding = %finding.id, reason = %check.reason, "safety recheck failed");
    Some(CleanupOutcome::skipped(
        finding,
        format!("Failed safety recheck: {}", check.reason),
        check.category,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::progress::NoProgress;

    #[test]
    fn test_worker_count_bounds() {
        let engine = CleanupEngine::new(ActionRegistry::new());
        let n = engine.worker_count();
        assert!((MIN_WORKERS..=MAX_WORKERS).contains(&n));

        let engine = CleanupEngine::new(ActionRegistry::new()).with_worker_limit(0);
        assert_eq!(engine.worker_count(), 1);
    }

    #[test]
    fn test_empty_selection_returns_immediately() {
        let engine = CleanupEngine::new(ActionRegistry::new());
        let mut calls = 0;
        let mut sink = |_: crate::model::CleanupProgress| calls += 1;
        let outcomes = engine
            .execute(&[], &["nope".to_string()], &SafetyPolicy::new(), &CancelToken::new(), &mut sink)
            .unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(calls, 0);

        let outcomes = engine
            .execute(&[], &[], &SafetyPolicy::new(), &CancelToken::new(), &mut NoProgress)
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
