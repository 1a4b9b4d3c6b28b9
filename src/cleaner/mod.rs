pub mod actions;
pub mod classify;
pub mod engine;
pub mod progress;
pub mod trash;

pub use actions::{ActionRegistry, CleanupAction, EmptyTrashAction, MoveToTrashAction, PermanentDeleteAction};
pub use classify::{failure_kind, failure_outcome, FailureKind};
pub use engine::{CleanupEngine, MAX_WORKERS, MIN_WORKERS};
pub use progress::{with_aggregator, NoProgress, ProgressSink, ProgressTally};
pub use trash::{StagingTrash, TrashBin, TrashUsage};
