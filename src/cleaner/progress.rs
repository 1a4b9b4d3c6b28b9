use crossbeam_channel::{unbounded, Sender};

use crate::model::CleanupProgress;

/// Receives progress snapshots during a cleanup.
///
/// Snapshots arrive from a single aggregator thread, so implementations
/// need `Send` but not `Sync`.
pub trait ProgressSink: Send {
    fn report(&mut self, progress: CleanupProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(CleanupProgress) + Send,
{
    fn report(&mut self, progress: CleanupProgress) {
        self(progress)
    }
}

/// Discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: CleanupProgress) {}
}

/// Owns the counters for one cleanup call
#[derive(Debug, Clone, Copy)]
pub struct ProgressTally {
    progress: CleanupProgress,
}

impl ProgressTally {
    pub fn new(total: usize) -> Self {
        Self {
            progress: CleanupProgress {
                total,
                ..CleanupProgress::default()
            },
        }
    }

    /// Count one finished item and return the new snapshot
    pub fn record(&mut self, success: bool) -> CleanupProgress {
        self.progress.processed += 1;
        if success {
            self.progress.deleted += 1;
        } else {
            self.progress.skipped += 1;
        }
        self.progress
    }

    pub fn snapshot(&self) -> CleanupProgress {
        self.progress
    }
}

/// Run `work` while a dedicated thread turns per-item completions into
/// snapshots for `sink`.
///
/// `work` sends `true` (deleted) or `false` (skipped) once per finished
/// item. The initial all-zero snapshot is published before any item
/// completes; the final snapshot is returned alongside `work`'s result.
pub fn with_aggregator<S, R>(
    total: usize,
    sink: &mut S,
    work: impl FnOnce(&Sender<bool>) -> R,
) -> (R, CleanupProgress)
where
    S: ProgressSink + ?Sized,
{
    let (tx, rx) = unbounded::<bool>();

    std::thread::scope(|scope| {
        let aggregator = scope.spawn(move || {
            let mut tally = ProgressTally::new(total);
            sink.report(tally.snapshot());
            for success in rx {
                let snapshot = tally.record(success);
                sink.report(snapshot);
            }
            tally.snapshot()
        });

        let result = work(&tx);
        drop(tx);

        let progress = aggregator
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (result, progress)
    })
}
