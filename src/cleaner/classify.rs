use std::io::{self, ErrorKind};

use crate::model::{CleanupOutcome, Finding, OutcomeCategory};

#[cfg(windows)]
mod codes {
    pub const SHARING_VIOLATION: i32 = 32;
    pub const LOCK_VIOLATION: i32 = 33;
    pub const DIR_NOT_EMPTY: i32 = 145;
    pub const CANCELLED: i32 = 1223;
}

#[cfg(unix)]
mod codes {
    pub const EBUSY: i32 = 16;
    pub const ETXTBSY: i32 = 26;
    pub const ENOTEMPTY_LINUX: i32 = 39;
    pub const ENOTEMPTY_BSD: i32 = 66;
}

/// Why a single delete failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Sharing or lock violation, busy, or non-empty directory
    Locked,
    AccessDenied,
    NotFound,
    Canceled,
    Other,
}

pub fn failure_kind(err: &io::Error) -> FailureKind {
    if is_locked_os_error(err) {
        return FailureKind::Locked;
    }
    match err.kind() {
        ErrorKind::PermissionDenied => FailureKind::AccessDenied,
        ErrorKind::NotFound => FailureKind::NotFound,
        ErrorKind::Interrupted => FailureKind::Canceled,
        ErrorKind::ResourceBusy | ErrorKind::DirectoryNotEmpty => FailureKind::Locked,
        _ => FailureKind::Other,
    }
}

#[cfg(windows)]
fn is_locked_os_error(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(codes::SHARING_VIOLATION | codes::LOCK_VIOLATION | codes::DIR_NOT_EMPTY)
    )
}

#[cfg(unix)]
fn is_locked_os_error(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(codes::EBUSY | codes::ETXTBSY | codes::ENOTEMPTY_LINUX | codes::ENOTEMPTY_BSD)
    )
}

#[cfg(not(any(windows, unix)))]
fn is_locked_os_error(_err: &io::Error) -> bool {
    false
}

#[cfg(windows)]
fn is_cancel_os_error(err: &io::Error) -> bool {
    err.raw_os_error() == Some(codes::CANCELLED)
}

#[cfg(not(windows))]
fn is_cancel_os_error(_err: &io::Error) -> bool {
    false
}

/// Turn a failed delete into a skipped outcome
pub fn failure_outcome(finding: &Finding, err: &io::Error) -> CleanupOutcome {
    let kind = if is_cancel_os_error(err) {
        FailureKind::Canceled
    } else {
        failure_kind(err)
    };

    match kind {
        FailureKind::Locked => CleanupOutcome::skipped(
            finding,
            format!("Locked or in use: {}", err),
            OutcomeCategory::SkippedLocked,
        ),
        FailureKind::AccessDenied => CleanupOutcome::skipped(
            finding,
            format!("Access denied: {}", err),
            OutcomeCategory::SkippedAccessDenied,
        ),
        FailureKind::NotFound => not_found(finding),
        FailureKind::Canceled => CleanupOutcome::skipped(
            finding,
            "Delete canceled; skipped.",
            OutcomeCategory::SkippedOther,
        ),
        FailureKind::Other => CleanupOutcome::skipped(
            finding,
            format!("Unable to delete: {}", err),
            OutcomeCategory::SkippedOther,
        ),
    }
}

pub fn not_found(finding: &Finding) -> CleanupOutcome {
    CleanupOutcome::skipped(finding, "Path not found.", OutcomeCategory::SkippedOther)
}

pub fn missing_path(finding: &Finding) -> CleanupOutcome {
    CleanupOutcome::skipped(finding, "Missing path.", OutcomeCategory::SkippedOther)
}

pub fn directory_not_empty(finding: &Finding) -> CleanupOutcome {
    CleanupOutcome::skipped(
        finding,
        "Directory not empty; skipped.",
        OutcomeCategory::SkippedLocked,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CleanupVerb, Confidence};

    fn finding() -> Finding {
        Finding {
            id: "x".into(),
            category_id: "temp.user".into(),
            discoverer_id: "provider.user-temp".into(),
            drive_root: "/".into(),
            path: Some("/tmp/x".into()),
            size_bytes: 9,
            last_write: None,
            confidence: Confidence::High,
            reason: String::new(),
            requires_elevation: false,
            requires_app_closed: false,
            verb: CleanupVerb::PermanentDelete,
        }
    }

    #[test]
    fn test_kinds_from_error_kind() {
        let denied = io::Error::from(ErrorKind::PermissionDenied);
        assert_eq!(failure_kind(&denied), FailureKind::AccessDenied);
        assert_eq!(failure_kind(&io::Error::from(ErrorKind::NotFound)), FailureKind::NotFound);
        assert_eq!(failure_kind(&io::Error::from(ErrorKind::Interrupted)), FailureKind::Canceled);
        assert_eq!(failure_kind(&io::Error::other("boom")), FailureKind::Other);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_busy_and_not_empty_are_locked() {
        assert_eq!(failure_kind(&io::Error::from_raw_os_error(16)), FailureKind::Locked);
        assert_eq!(failure_kind(&io::Error::from_raw_os_error(26)), FailureKind::Locked);
        assert_eq!(failure_kind(&io::Error::from_raw_os_error(39)), FailureKind::Locked);
    }

    #[test]
    fn test_outcomes_reclaim_nothing() {
        let f = finding();
        let outcome = failure_outcome(&f, &io::Error::from(ErrorKind::PermissionDenied));
        assert!(!outcome.success);
        assert_eq!(outcome.bytes_reclaimed, 0);
        assert_eq!(outcome.category, OutcomeCategory::SkippedAccessDenied);

        let outcome = failure_outcome(&f, &io::Error::from(ErrorKind::NotFound));
        assert_eq!(outcome.message, "Path not found.");
        assert_eq!(outcome.category, OutcomeCategory::SkippedOther);

        let outcome = failure_outcome(&f, &io::Error::from(ErrorKind::Interrupted));
        assert_eq!(outcome.message, "Delete canceled; skipped.");
    }
}
