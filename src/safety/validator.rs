use chrono::{DateTime, Duration, Utc};
use std::io::ErrorKind;
use std::path::Path;

use super::policy::SafetyPolicy;
use super::rules::{eq_ignore_case, is_old_enough, is_protected_path, is_under_allowlist, is_within};
use crate::model::{category, CleanupVerb, Finding, OutcomeCategory};

/// Extensions treated as installer payloads by the compatibility guard
const INSTALLER_EXTENSIONS: &[&str] = &["msi", "msp", "cab", "exe", "ps1", "bat", "cmd"];

/// Accept/reject decision for one finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyCheck {
    pub ok: bool,
    /// Empty when accepted
    pub reason: String,
    /// `Deleted` when accepted, otherwise the rejection category
    pub category: OutcomeCategory,
}

impl SafetyCheck {
    fn accept() -> Self {
        Self {
            ok: true,
            reason: String::new(),
            category: OutcomeCategory::Deleted,
        }
    }

    fn reject(reason: impl Into<String>, category: OutcomeCategory) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
            category,
        }
    }

    fn safety(reason: impl Into<String>) -> Self {
        Self::reject(reason, OutcomeCategory::SkippedSafetyRecheck)
    }
}

/// Re-derive eligibility of `finding` from the live filesystem, now.
///
/// Called immediately before every destructive action. Nothing from scan
/// time is trusted except identity, path and category.
pub fn validate(finding: &Finding, policy: &SafetyPolicy) -> SafetyCheck {
    validate_at(finding, policy, Utc::now())
}

/// [`validate`] against an explicit clock
pub fn validate_at(finding: &Finding, policy: &SafetyPolicy, now: DateTime<Utc>) -> SafetyCheck {
    if finding.discoverer_id.trim().is_empty() {
        return SafetyCheck::safety("Missing provider id.");
    }

    if finding.verb == CleanupVerb::EmptyTrash {
        return validate_trash_target(finding, policy);
    }

    let Some(path) = finding.path.as_deref().filter(|p| !p.as_os_str().is_empty()) else {
        return SafetyCheck::safety("Missing path.");
    };
    let path_text = path.to_string_lossy();

    if !is_under_allowlist(&finding.discoverer_id, &path_text, policy) {
        return SafetyCheck::safety("Path is outside allowlist.");
    }
    if is_protected_path(&path_text, policy) {
        return SafetyCheck::safety("Path is protected by denylist.");
    }

    let last_write = match probe_last_write(path) {
        Ok(t) => t,
        Err(check) => return check,
    };

    if !is_old_enough(&finding.category_id, Some(last_write), policy, now) {
        return SafetyCheck::reject("Too new for retention policy.", OutcomeCategory::SkippedTooNew);
    }

    if category::is_temp(&finding.category_id) {
        let guard_hours = policy.recent_file_guard_hours;
        if guard_hours > 0 && is_within(last_write, now, Duration::hours(i64::from(guard_hours))) {
            return SafetyCheck::reject(
                format!("Recent file guard (<{}h).", guard_hours),
                OutcomeCategory::SkippedTooNew,
            );
        }

        let guard_days = policy.compatibility_installer_guard_days;
        if policy.compatibility_mode_enabled
            && guard_days > 0
            && is_installer_like(path)
            && is_within(last_write, now, Duration::days(i64::from(guard_days)))
        {
            return SafetyCheck::reject(
                format!("Compatibility guard (installer-like, <{}d).", guard_days),
                OutcomeCategory::SkippedCompatibility,
            );
        }
    }

    SafetyCheck::accept()
}

/// Empty-trash findings name a drive, not a file: path must equal the
/// drive root. No age check applies.
fn validate_trash_target(finding: &Finding, policy: &SafetyPolicy) -> SafetyCheck {
    let path = finding.path_str().unwrap_or_default();
    if path.trim().is_empty() || finding.drive_root.trim().is_empty() {
        return SafetyCheck::safety("Missing Recycle Bin drive root.");
    }
    if !eq_ignore_case(&path, &finding.drive_root) {
        return SafetyCheck::safety("Recycle Bin path mismatch.");
    }
    if !is_under_allowlist(&finding.discoverer_id, &path, policy) {
        return SafetyCheck::safety("Recycle Bin drive not in allowlist.");
    }
    if is_protected_path(&path, policy) {
        return SafetyCheck::safety("Drive root is protected.");
    }
    SafetyCheck::accept()
}

/// Fresh last-write time. Symlinked directories are refused outright so
/// a directory swapped for a link after the scan is never followed.
fn probe_last_write(path: &Path) -> Result<DateTime<Utc>, SafetyCheck> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SafetyCheck::safety("Path not found."));
        }
        Err(e) => return Err(SafetyCheck::safety(format!("Unable to read attributes: {}", e))),
    };

    if meta.file_type().is_symlink() {
        let points_at_dir = std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false);
        if points_at_dir {
            return Err(SafetyCheck::safety("Directory is a reparse point."));
        }
    }

    meta.modified()
        .map(DateTime::<Utc>::from)
        .map_err(|e| SafetyCheck::safety(format!("Unable to read attributes: {}", e)))
}

/// Extension is in the installer-like set guarded in temp categories
pub fn is_installer_like(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| INSTALLER_EXTENSIONS.iter().any(|i| i.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Confidence;
    use std::path::PathBuf;

    fn finding(path: Option<&str>, verb: CleanupVerb) -> Finding {
        Finding {
            id: "f1".into(),
            category_id: "temp.user".into(),
            discoverer_id: "provider.user-temp".into(),
            drive_root: r"C:\".into(),
            path: path.map(PathBuf::from),
            size_bytes: 10,
            last_write: None,
            confidence: Confidence::High,
            reason: String::new(),
            requires_elevation: false,
            requires_app_closed: false,
            verb,
        }
    }

    #[test]
    fn test_missing_discoverer_id() {
        let mut f = finding(Some("/tmp/x"), CleanupVerb::MoveToTrash);
        f.discoverer_id = "  ".into();
        let check = validate(&f, &SafetyPolicy::new());
        assert!(!check.ok);
        assert_eq!(check.reason, "Missing provider id.");
        assert_eq!(check.category, OutcomeCategory::SkippedSafetyRecheck);
    }

    #[test]
    fn test_missing_path() {
        let f = finding(None, CleanupVerb::PermanentDelete);
        let check = validate(&f, &SafetyPolicy::new());
        assert_eq!(check.reason, "Missing path.");
    }

    #[test]
    fn test_outside_allowlist_checked_before_disk() {
        let f = finding(Some(r"C:\Temp2\a.tmp"), CleanupVerb::MoveToTrash);
        let mut policy = SafetyPolicy::new();
        policy.add_allowlist("provider.user-temp", [r"C:\Temp"]);
        let check = validate(&f, &policy);
        assert_eq!(check.reason, "Path is outside allowlist.");
    }

    #[test]
    fn test_protected_veto() {
        let f = finding(Some(r"C:\Users\Alice\Documents\file.tmp"), CleanupVerb::MoveToTrash);
        let mut policy = SafetyPolicy::new();
        policy.add_allowlist("provider.user-temp", [r"C:\Users\Alice\Documents\"]);
        let check = validate(&f, &policy);
        assert_eq!(check.reason, "Path is protected by denylist.");
        assert_eq!(check.category, OutcomeCategory::SkippedSafetyRecheck);
    }

    #[test]
    fn test_empty_trash_target() {
        let mut f = finding(Some(r"Z:\"), CleanupVerb::EmptyTrash);
        f.drive_root = r"z:\".into();
        f.discoverer_id = "provider.recycle-bin".into();
        f.category_id = "recyclebin".into();

        let mut policy = SafetyPolicy::new();
        assert_eq!(validate(&f, &policy).reason, "Recycle Bin drive not in allowlist.");

        policy.add_allowlist("provider.recycle-bin", [r"Z:\"]);
        assert!(validate(&f, &policy).ok);

        f.drive_root = r"Y:\".into();
        assert_eq!(validate(&f, &policy).reason, "Recycle Bin path mismatch.");

        f.path = None;
        assert_eq!(validate(&f, &policy).reason, "Missing Recycle Bin drive root.");
    }

    #[test]
    fn test_installer_extensions() {
        assert!(is_installer_like(Path::new("/tmp/setup.MSI")));
        assert!(is_installer_like(Path::new("/tmp/run.ps1")));
        assert!(!is_installer_like(Path::new("/tmp/notes.txt")));
        assert!(!is_installer_like(Path::new("/tmp/noext")));
    }
}
