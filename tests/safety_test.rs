use chrono::{Duration, Utc};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use reclaim::model::{CleanupVerb, Confidence, Finding, OutcomeCategory};
use reclaim::safety::{
    is_allowed_path, is_old_enough, is_protected_path, is_under_allowlist, validate, validate_at,
    SafetyPolicy,
};

const PROVIDER: &str = "provider.user-temp";

fn finding_at(path: &Path, category_id: &str) -> Finding {
    Finding {
        id: "provider.user-temp:1".into(),
        category_id: category_id.into(),
        discoverer_id: PROVIDER.into(),
        drive_root: "/".into(),
        path: Some(path.to_path_buf()),
        size_bytes: 4,
        last_write: None,
        confidence: Confidence::High,
        reason: String::new(),
        requires_elevation: false,
        requires_app_closed: false,
        verb: CleanupVerb::MoveToTrash,
    }
}

fn write_aged(path: &Path, age: Duration) {
    fs::write(path, b"data").unwrap();
    let when = SystemTime::from(Utc::now() - age);
    File::options().write(true).open(path).unwrap().set_modified(when).unwrap();
}

fn policy_for(root: &Path) -> SafetyPolicy {
    let mut policy = SafetyPolicy::new();
    policy.add_allowlist(PROVIDER, [root.to_string_lossy()]);
    policy
}

// ─── Path rules ──────────────────────────────────────────────────────────────

#[test]
fn test_allowlist_and_protection_scenario() {
    let mut policy = SafetyPolicy::new();
    policy.add_allowlist(PROVIDER, [r"C:\Users\Alice\AppData\Local\Temp\"]);

    let inside = r"C:\Users\Alice\AppData\Local\Temp\setup.log";
    let documents = r"C:\Users\Alice\Documents\x.tmp";

    assert!(is_allowed_path(PROVIDER, inside, &policy));
    assert!(!is_under_allowlist(PROVIDER, documents, &policy));
    assert!(is_protected_path(documents, &policy));
    assert!(!is_allowed_path("provider.other", inside, &policy));
}

#[test]
fn test_sibling_with_shared_prefix_is_outside() {
    let mut policy = SafetyPolicy::new();
    policy.add_allowlist(PROVIDER, [r"C:\Temp"]);

    assert!(is_under_allowlist(PROVIDER, r"C:\Temp\a.tmp", &policy));
    assert!(!is_under_allowlist(PROVIDER, r"C:\Temp2\a.tmp", &policy));
    assert!(is_under_allowlist(PROVIDER, r"c:\temp\SUB\..\b.tmp", &policy));
}

#[test]
fn test_protection_vetoes_allowlist() {
    let mut policy = SafetyPolicy::new();
    policy.add_allowlist(PROVIDER, [r"C:\"]);

    assert!(is_under_allowlist(PROVIDER, r"C:\Windows\System32\drivers\x.sys", &policy));
    assert!(!is_allowed_path(PROVIDER, r"C:\Windows\System32\drivers\x.sys", &policy));
    assert!(!is_allowed_path(PROVIDER, r"C:\Program Files\App\cache.bin", &policy));
}

#[test]
fn test_retention_boundary() {
    let mut policy = SafetyPolicy::new();
    policy.set_retention_days("cache.browser", 7);
    let now = Utc::now();

    assert!(is_old_enough("cache.browser", Some(now - Duration::days(7)), &policy, now));
    assert!(!is_old_enough("cache.browser", Some(now - Duration::days(6)), &policy, now));
    assert!(!is_old_enough("cache.browser", None, &policy, now));

    policy.clear_retention_days("cache.browser");
    assert!(is_old_enough("cache.browser", Some(now - Duration::hours(24)), &policy, now));
    assert!(!is_old_enough("cache.browser", Some(now - Duration::hours(23)), &policy, now));
}

// ─── Validator against the live filesystem ───────────────────────────────────

#[test]
fn test_old_file_under_allowlist_passes() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("old.tmp");
    write_aged(&file, Duration::days(10));

    let check = validate(&finding_at(&file, "temp.user"), &policy_for(dir.path()));
    assert!(check.ok, "rejected: {}", check.reason);
    assert_eq!(check.category, OutcomeCategory::Deleted);
    assert!(check.reason.is_empty());
}

#[test]
fn test_file_rewritten_since_scan_is_too_new() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("touched.tmp");
    write_aged(&file, Duration::days(3));

    let check = validate(&finding_at(&file, "temp.user"), &policy_for(dir.path()));
    assert!(!check.ok);
    assert_eq!(check.reason, "Too new for retention policy.");
    assert_eq!(check.category, OutcomeCategory::SkippedTooNew);
}

#[test]
fn test_recent_file_guard() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fresh.tmp");
    write_aged(&file, Duration::hours(10));

    let mut policy = policy_for(dir.path());
    policy.set_retention_days("temp.user", 0);

    let check = validate(&finding_at(&file, "temp.user"), &policy);
    assert_eq!(check.reason, "Recent file guard (<48h).");
    assert_eq!(check.category, OutcomeCategory::SkippedTooNew);

    // Guards only apply to temp categories
    let check = validate(&finding_at(&file, "cache.thumbnails"), &{
        let mut p = SafetyPolicy::new();
        p.add_allowlist(PROVIDER, [dir.path().to_string_lossy()]);
        p.set_retention_days("cache.thumbnails", 0);
        p
    });
    assert!(check.ok, "rejected: {}", check.reason);
}

#[test]
fn test_compatibility_guard_for_installers() {
    let dir = tempfile::tempdir().unwrap();
    let installer = dir.path().join("setup.msi");
    let log = dir.path().join("setup.log");
    write_aged(&installer, Duration::days(10));
    write_aged(&log, Duration::days(10));

    let mut policy = policy_for(dir.path());
    let check = validate(&finding_at(&installer, "temp.user"), &policy);
    assert_eq!(check.reason, "Compatibility guard (installer-like, <14d).");
    assert_eq!(check.category, OutcomeCategory::SkippedCompatibility);
    assert!(validate(&finding_at(&log, "temp.user"), &policy).ok);

    policy.compatibility_mode_enabled = false;
    assert!(validate(&finding_at(&installer, "temp.user"), &policy).ok);
}

#[test]
fn test_vanished_file_fails_recheck() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("gone.tmp");

    let check = validate(&finding_at(&gone, "temp.user"), &policy_for(dir.path()));
    assert_eq!(check.reason, "Path not found.");
    assert_eq!(check.category, OutcomeCategory::SkippedSafetyRecheck);
}

#[test]
fn test_path_outside_allowlist_rejected_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    let file = other.path().join("x.tmp");
    write_aged(&file, Duration::days(30));

    let check = validate(&finding_at(&file, "temp.user"), &policy_for(dir.path()));
    assert_eq!(check.reason, "Path is outside allowlist.");
    assert_eq!(check.category, OutcomeCategory::SkippedSafetyRecheck);
}

#[test]
fn test_extra_protected_path_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let keep = dir.path().join("keep");
    fs::create_dir(&keep).unwrap();
    let file = keep.join("x.tmp");
    write_aged(&file, Duration::days(30));

    let mut policy = policy_for(dir.path());
    policy.add_protected_prefix(&format!("{}/", keep.display()));

    let check = validate(&finding_at(&file, "temp.user"), &policy);
    assert_eq!(check.reason, "Path is protected by denylist.");
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(target.path(), &link).unwrap();

    let check = validate(&finding_at(&link, "temp.user"), &policy_for(dir.path()));
    assert_eq!(check.reason, "Directory is a reparse point.");
}

#[test]
fn test_missing_identity_fields() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_for(dir.path());

    let mut f = finding_at(&dir.path().join("x"), "temp.user");
    f.discoverer_id = "  ".into();
    assert_eq!(validate(&f, &policy).reason, "Missing provider id.");

    let mut f = finding_at(&dir.path().join("x"), "temp.user");
    f.path = None;
    assert_eq!(validate(&f, &policy).reason, "Missing path.");
}

#[test]
fn test_empty_trash_target_rules() {
    let mut policy = SafetyPolicy::new();
    policy.add_allowlist("provider.recycle-bin", [r"D:\"]);

    let mut f = finding_at(&PathBuf::from(r"D:\"), "recyclebin");
    f.discoverer_id = "provider.recycle-bin".into();
    f.drive_root = r"D:\".into();
    f.verb = CleanupVerb::EmptyTrash;
    // No age check for trash: last_write is irrelevant
    assert!(validate_at(&f, &policy, Utc::now()).ok);

    f.path = Some(PathBuf::from(r"D:\$Recycle.Bin"));
    assert_eq!(validate(&f, &policy).reason, "Recycle Bin path mismatch.");

    f.path = Some(PathBuf::from(r"E:\"));
    f.drive_root = r"E:\".into();
    assert_eq!(validate(&f, &policy).reason, "Recycle Bin drive not in allowlist.");

    f.drive_root = String::new();
    assert_eq!(validate(&f, &policy).reason, "Missing Recycle Bin drive root.");
}

#[test]
fn test_validation_uses_supplied_clock() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.tmp");
    write_aged(&file, Duration::days(10));
    let policy = policy_for(dir.path());
    let f = finding_at(&file, "temp.user");

    assert!(validate_at(&f, &policy, Utc::now()).ok);
    let earlier = Utc::now() - Duration::days(5);
    assert_eq!(validate_at(&f, &policy, earlier).reason, "Too new for retention policy.");
}

#[test]
fn test_revalidating_unchanged_file_gives_same_decision() {
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("old.tmp");
    let fresh = dir.path().join("fresh.tmp");
    write_aged(&old, Duration::days(10));
    write_aged(&fresh, Duration::days(2));
    let policy = policy_for(dir.path());

    let accepted = finding_at(&old, "temp.user");
    let first = validate(&accepted, &policy);
    assert!(first.ok);
    assert_eq!(validate(&accepted, &policy), first);

    let rejected = finding_at(&fresh, "temp.user");
    let first = validate(&rejected, &policy);
    assert_eq!(first.category, OutcomeCategory::SkippedTooNew);
    assert_eq!(validate(&rejected, &policy), first);
}

// ─── Out-of-range settings ───────────────────────────────────────────────────

#[test]
fn test_huge_retention_rejects_instead_of_overflowing() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("old.tmp");
    write_aged(&file, Duration::days(10));

    let mut policy = policy_for(dir.path());
    policy.set_retention_days("temp.user", 200_000_000);

    let check = validate(&finding_at(&file, "temp.user"), &policy);
    assert_eq!(check.reason, "Too new for retention policy.");
}

#[test]
fn test_huge_guard_windows_cover_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("old.tmp");
    let installer = dir.path().join("setup.exe");
    write_aged(&file, Duration::days(10));
    write_aged(&installer, Duration::days(10));

    let mut policy = policy_for(dir.path());
    policy.recent_file_guard_hours = u32::MAX;
    let check = validate(&finding_at(&file, "temp.user"), &policy);
    assert_eq!(check.reason, format!("Recent file guard (<{}h).", u32::MAX));

    policy.recent_file_guard_hours = 0;
    policy.compatibility_installer_guard_days = u32::MAX;
    let check = validate(&finding_at(&installer, "temp.user"), &policy);
    assert_eq!(check.category, OutcomeCategory::SkippedCompatibility);
    assert!(validate(&finding_at(&file, "temp.user"), &policy).ok);
}
