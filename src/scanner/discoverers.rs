//! Built-in discoverers, one per content category.
//!
//! Every file-based discoverer follows the same shape: find its roots,
//! register each existing root in the allow-list, walk it, and keep only
//! entries that are allowed and old enough. The environment decides the
//! default roots; `with_roots` style constructors pin them for tests and
//! custom layouts.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::walker::{enumerate_entries, Entry};
use super::Discoverer;
use crate::cleaner::trash::TrashBin;
use crate::common::errors::ScanError;
use crate::common::CancelToken;
use crate::model::{category, Category, CleanupVerb, Confidence, Finding};
use crate::safety::temp_roots::{is_safe_system_temp_root, is_safe_user_temp_root, system_temp_dir};
use crate::safety::{
    is_allowed_path, is_installer_like, is_old_enough, is_within, path_root, retention_days, SafetyPolicy,
};

pub const USER_TEMP_ID: &str = "provider.user-temp";
pub const SYSTEM_TEMP_ID: &str = "provider.system-temp";
pub const UPDATE_CACHE_ID: &str = "provider.windows-update-cache";
pub const THUMBNAIL_CACHE_ID: &str = "provider.thumbnail-cache";
pub const SHADER_CACHE_ID: &str = "provider.directx-shader-cache";
pub const BROWSER_CACHE_ID: &str = "provider.browser-cache";
pub const CRASH_REPORTS_ID: &str = "provider.wer-reports";
pub const TRASH_ID: &str = "provider.recycle-bin";

/// Every built-in discoverer, in scan order
pub fn default_discoverers(trash: Arc<dyn TrashBin>) -> Vec<Box<dyn Discoverer>> {
    vec![
        Box::new(UserTempDiscoverer::from_env()),
        Box::new(SystemTempDiscoverer::from_env()),
        Box::new(UpdateCacheDiscoverer::from_env()),
        Box::new(ThumbnailCacheDiscoverer::from_env()),
        Box::new(ShaderCacheDiscoverer::from_env()),
        Box::new(BrowserCacheDiscoverer::from_env()),
        Box::new(CrashReportDiscoverer::from_env()),
        Box::new(TrashDiscoverer::new(trash)),
    ]
}

// ─── Shared tree scan ───────────────────────────────────────────────────────

/// How findings under one root are labelled and filtered
struct TreeScan<'a> {
    id: &'a str,
    category: &'static Category,
    /// Noun used in reasons, e.g. "Temp file" / "temp folder"
    file_label: &'a str,
    dir_label: &'a str,
    requires_elevation: bool,
    requires_app_closed: bool,
    /// Pre-apply the recent-file and compatibility guards
    temp_guards: bool,
}

#[derive(Debug, Default)]
struct GuardHits {
    recent: bool,
    compatibility: bool,
}

impl TreeScan<'_> {
    fn scan_root(
        &self,
        root: &Path,
        policy: &SafetyPolicy,
        cancel: &CancelToken,
        now: DateTime<Utc>,
        hits: &mut GuardHits,
    ) -> Result<Vec<Finding>, ScanError> {
        let entries = enumerate_entries(root, policy, cancel)?;
        self.collect(entries, policy, cancel, now, hits)
    }

    fn collect(
        &self,
        entries: Vec<Entry>,
        policy: &SafetyPolicy,
        cancel: &CancelToken,
        now: DateTime<Utc>,
        hits: &mut GuardHits,
    ) -> Result<Vec<Finding>, ScanError> {
        let mut findings = Vec::new();

        for entry in entries {
            if cancel.is_canceled() {
                return Err(ScanError::Canceled);
            }

            let path_text = entry.path.to_string_lossy().into_owned();
            if !is_allowed_path(self.id, &path_text, policy) {
                continue;
            }

            let meta = match std::fs::symlink_metadata(&entry.path) {
                Ok(m) => m,
                Err(e) => {
                    policy.report_warning(format!("Skip entry: {} ({})", path_text, e));
                    continue;
                }
            };
            let last_write = meta.modified().ok().map(DateTime::<Utc>::from);
            let size_bytes = if entry.is_dir { 0 } else { meta.len() };

            if !is_old_enough(self.category.id, last_write, policy, now) {
                continue;
            }

            if self.temp_guards {
                if let Some(lw) = last_write {
                    let guard_hours = policy.recent_file_guard_hours;
                    if guard_hours > 0 && is_within(lw, now, Duration::hours(i64::from(guard_hours))) {
                        hits.recent = true;
                        continue;
                    }

                    let guard_days = policy.compatibility_installer_guard_days;
                    if !entry.is_dir
                        && policy.compatibility_mode_enabled
                        && guard_days > 0
                        && is_within(lw, now, Duration::days(i64::from(guard_days)))
                        && is_installer_like(&entry.path)
                    {
                        hits.compatibility = true;
                        continue;
                    }
                }
            }

            let days = retention_days(self.category.id, policy);
            let reason = if entry.is_dir {
                format!("Empty {} older than {} days.", self.dir_label, days)
            } else {
                format!("{} older than {} days.", self.file_label, days)
            };

            findings.push(Finding {
                id: new_finding_id(self.id),
                category_id: self.category.id.to_string(),
                discoverer_id: self.id.to_string(),
                drive_root: path_root(&path_text),
                path: Some(entry.path),
                size_bytes,
                last_write,
                confidence: Confidence::High,
                reason,
                requires_elevation: self.requires_elevation,
                requires_app_closed: self.requires_app_closed,
                verb: CleanupVerb::MoveToTrash,
            });
        }

        Ok(findings)
    }
}

fn new_finding_id(discoverer_id: &str) -> String {
    format!("{}:{}", discoverer_id, uuid::Uuid::new_v4().simple())
}

/// Register `root` and scan it, if it exists
fn scan_existing_root(
    scan: &TreeScan<'_>,
    root: &Path,
    policy: &mut SafetyPolicy,
    cancel: &CancelToken,
    now: DateTime<Utc>,
    hits: &mut GuardHits,
) -> Result<Vec<Finding>, ScanError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    policy.add_allowlist(scan.id, [root.to_string_lossy()]);
    scan.scan_root(root, policy, cancel, now, hits)
}

fn report_guard_hits(policy: &SafetyPolicy, hits: &GuardHits, label: &str) {
    if hits.recent {
        policy.report_warning(format!(
            "Recent-file guard skipped some {} items (<{}h).",
            label, policy.recent_file_guard_hours
        ));
    }
    if hits.compatibility {
        policy.report_warning(format!(
            "Compatibility guard skipped installer-like {} items (<{}d).",
            label, policy.compatibility_installer_guard_days
        ));
    }
}

fn dedupe_ignore_case(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty())
        .filter(|p| seen.insert(p.to_string_lossy().to_lowercase()))
        .collect()
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// ─── User temp ──────────────────────────────────────────────────────────────

/// Per-user temp directories
#[derive(Debug, Clone)]
pub struct UserTempDiscoverer {
    roots: Vec<PathBuf>,
}

impl UserTempDiscoverer {
    pub fn from_env() -> Self {
        let candidates = std::iter::once(std::env::temp_dir())
            .chain(["TEMP", "TMP", "TMPDIR"].into_iter().filter_map(env_path));
        Self::with_roots(candidates)
    }

    pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: dedupe_ignore_case(roots),
        }
    }
}

impl Discoverer for UserTempDiscoverer {
    fn id(&self) -> &str {
        USER_TEMP_ID
    }

    fn category(&self) -> &'static Category {
        &category::USER_TEMP
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let scan = TreeScan {
            id: USER_TEMP_ID,
            category: self.category(),
            file_label: "Temp file",
            dir_label: "temp folder",
            requires_elevation: false,
            requires_app_closed: false,
            temp_guards: true,
        };
        let now = Utc::now();
        let mut hits = GuardHits::default();
        let mut unsafe_roots = Vec::new();
        let mut findings = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            let root_text = root.to_string_lossy();
            if !is_safe_user_temp_root(&root_text, policy) {
                unsafe_roots.push(root_text.into_owned());
                continue;
            }
            findings.extend(scan_existing_root(&scan, root, policy, cancel, now, &mut hits)?);
        }

        if !unsafe_roots.is_empty() {
            policy.report_warning(format!("Skipped unsafe temp roots: {}", unsafe_roots.join(", ")));
        }
        report_guard_hits(policy, &hits, "user temp");

        Ok(findings)
    }
}

// ─── System temp ────────────────────────────────────────────────────────────

/// The machine-wide temp directory; needs elevation to clean
#[derive(Debug, Clone)]
pub struct SystemTempDiscoverer {
    root: Option<PathBuf>,
}

impl SystemTempDiscoverer {
    pub fn from_env() -> Self {
        Self {
            root: system_temp_dir().map(PathBuf::from),
        }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl Discoverer for SystemTempDiscoverer {
    fn id(&self) -> &str {
        SYSTEM_TEMP_ID
    }

    fn category(&self) -> &'static Category {
        &category::SYSTEM_TEMP
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let Some(root) = self.root.as_deref().filter(|r| r.is_dir()) else {
            return Ok(Vec::new());
        };

        let root_text = root.to_string_lossy();
        if !is_safe_system_temp_root(&root_text, policy) {
            policy.report_warning(format!("Skipped unsafe temp roots: {}", root_text));
            return Ok(Vec::new());
        }

        let scan = TreeScan {
            id: SYSTEM_TEMP_ID,
            category: self.category(),
            file_label: "System temp file",
            dir_label: "system temp folder",
            requires_elevation: true,
            requires_app_closed: false,
            temp_guards: true,
        };
        let mut hits = GuardHits::default();
        let findings = scan_existing_root(&scan, root, policy, cancel, Utc::now(), &mut hits)?;
        report_guard_hits(policy, &hits, "system temp");

        Ok(findings)
    }
}

// ─── Update cache ───────────────────────────────────────────────────────────

/// Downloaded OS update payloads and the delivery-optimization cache
#[derive(Debug, Clone)]
pub struct UpdateCacheDiscoverer {
    roots: Vec<PathBuf>,
}

impl UpdateCacheDiscoverer {
    pub fn from_env() -> Self {
        let windows_dir = env_path("windir").or_else(|| env_path("SystemRoot"));
        let roots = match windows_dir {
            Some(dir) if cfg!(windows) => {
                let dist = dir.join("SoftwareDistribution");
                vec![
                    dist.join("Download"),
                    dist.join("DeliveryOptimization").join("Cache"),
                ]
            }
            _ => Vec::new(),
        };
        Self { roots }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl Discoverer for UpdateCacheDiscoverer {
    fn id(&self) -> &str {
        UPDATE_CACHE_ID
    }

    fn category(&self) -> &'static Category {
        &category::UPDATE_CACHE
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let scan = TreeScan {
            id: UPDATE_CACHE_ID,
            category: self.category(),
            file_label: "Windows Update cache file",
            dir_label: "Windows Update cache folder",
            requires_elevation: true,
            requires_app_closed: false,
            temp_guards: false,
        };
        let now = Utc::now();
        let mut hits = GuardHits::default();
        let mut findings = Vec::new();

        for root in &self.roots {
            findings.extend(scan_existing_root(&scan, root, policy, cancel, now, &mut hits)?);
        }

        Ok(findings)
    }
}

// ─── Thumbnail cache ────────────────────────────────────────────────────────

/// Thumbnail and icon cache databases
#[derive(Debug, Clone)]
pub struct ThumbnailCacheDiscoverer {
    root: Option<PathBuf>,
    /// Top-level file patterns; empty means walk the whole tree
    patterns: Vec<String>,
}

impl ThumbnailCacheDiscoverer {
    pub fn from_env() -> Self {
        if cfg!(windows) {
            Self {
                root: dirs::data_local_dir().map(|d| d.join("Microsoft").join("Windows").join("Explorer")),
                patterns: vec!["thumbcache*.db".into(), "iconcache*.db".into()],
            }
        } else {
            Self {
                root: dirs::cache_dir().map(|d| d.join("thumbnails")),
                patterns: Vec::new(),
            }
        }
    }

    pub fn with_root(root: impl Into<PathBuf>, patterns: &[&str]) -> Self {
        Self {
            root: Some(root.into()),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn pattern_entries(&self, root: &Path, policy: &SafetyPolicy) -> Option<Vec<Entry>> {
        let base = glob::Pattern::escape(&root.to_string_lossy());
        let options = glob::MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for pattern in &self.patterns {
            let full = format!("{}{}{}", base, std::path::MAIN_SEPARATOR, pattern);
            let paths = match glob::glob_with(&full, options) {
                Ok(paths) => paths,
                Err(e) => {
                    policy.report_warning(format!(
                        "Skip thumbnail cache listing: {} ({})",
                        root.display(),
                        e
                    ));
                    return None;
                }
            };
            for path in paths.filter_map(|p| p.ok()).filter(|p| p.is_file()) {
                if seen.insert(path.to_string_lossy().to_lowercase()) {
                    entries.push(Entry { path, is_dir: false });
                }
            }
        }
        Some(entries)
    }
}

impl Discoverer for ThumbnailCacheDiscoverer {
    fn id(&self) -> &str {
        THUMBNAIL_CACHE_ID
    }

    fn category(&self) -> &'static Category {
        &category::THUMBNAIL_CACHE
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let Some(root) = self.root.as_deref().filter(|r| r.is_dir()) else {
            return Ok(Vec::new());
        };

        let scan = TreeScan {
            id: THUMBNAIL_CACHE_ID,
            category: self.category(),
            file_label: "Thumbnail/icon cache file",
            dir_label: "thumbnail folder",
            requires_elevation: false,
            requires_app_closed: true,
            temp_guards: false,
        };
        let now = Utc::now();
        let mut hits = GuardHits::default();

        if self.patterns.is_empty() {
            return scan_existing_root(&scan, root, policy, cancel, now, &mut hits);
        }

        policy.add_allowlist(THUMBNAIL_CACHE_ID, [root.to_string_lossy()]);
        match self.pattern_entries(root, policy) {
            Some(entries) => scan.collect(entries, policy, cancel, now, &mut hits),
            None => Ok(Vec::new()),
        }
    }
}

// ─── Shader cache ───────────────────────────────────────────────────────────

/// Compiled GPU shader caches; rebuilt by the driver on demand
#[derive(Debug, Clone)]
pub struct ShaderCacheDiscoverer {
    roots: Vec<PathBuf>,
}

impl ShaderCacheDiscoverer {
    pub fn from_env() -> Self {
        let roots = if cfg!(windows) {
            dirs::data_local_dir()
                .map(|local| vec![local.join("D3DSCache")])
                .unwrap_or_default()
        } else if cfg!(target_os = "macos") {
            Vec::new()
        } else {
            dirs::cache_dir()
                .map(|cache| {
                    vec![
                        cache.join("mesa_shader_cache"),
                        cache.join("nvidia").join("GLCache"),
                    ]
                })
                .unwrap_or_default()
        };
        Self { roots }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl Discoverer for ShaderCacheDiscoverer {
    fn id(&self) -> &str {
        SHADER_CACHE_ID
    }

    fn category(&self) -> &'static Category {
        &category::SHADER_CACHE
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let scan = TreeScan {
            id: SHADER_CACHE_ID,
            category: self.category(),
            file_label: "Shader cache file",
            dir_label: "shader cache folder",
            requires_elevation: false,
            requires_app_closed: false,
            temp_guards: false,
        };
        let now = Utc::now();
        let mut hits = GuardHits::default();
        let mut findings = Vec::new();

        for root in &self.roots {
            findings.extend(scan_existing_root(&scan, root, policy, cancel, now, &mut hits)?);
        }

        Ok(findings)
    }
}

// ─── Browser cache ──────────────────────────────────────────────────────────

/// Chromium-family and Firefox disk caches
#[derive(Debug, Clone)]
pub struct BrowserCacheDiscoverer {
    /// Chromium "User Data" directories holding `Default` / `Profile *`
    chromium_user_data: Vec<PathBuf>,
    /// Directories whose children are Firefox profiles
    firefox_profiles: Vec<PathBuf>,
}

const CHROMIUM_CACHE_DIRS: &[&str] = &["Cache", "Code Cache", "GPUCache"];

impl BrowserCacheDiscoverer {
    pub fn from_env() -> Self {
        let mut chromium = Vec::new();
        let mut firefox = Vec::new();

        if cfg!(windows) {
            if let Some(local) = dirs::data_local_dir() {
                chromium.push(local.join("Microsoft").join("Edge").join("User Data"));
                chromium.push(local.join("Google").join("Chrome").join("User Data"));
                firefox.push(local.join("Mozilla").join("Firefox").join("Profiles"));
            }
        } else if cfg!(target_os = "macos") {
            if let Some(caches) = dirs::cache_dir() {
                chromium.push(caches.join("Google").join("Chrome"));
                chromium.push(caches.join("Microsoft Edge"));
                firefox.push(caches.join("Firefox").join("Profiles"));
            }
        } else if let Some(caches) = dirs::cache_dir() {
            chromium.push(caches.join("google-chrome"));
            chromium.push(caches.join("chromium"));
            chromium.push(caches.join("microsoft-edge"));
            firefox.push(caches.join("mozilla").join("firefox"));
        }

        Self::with_roots(chromium, firefox)
    }

    pub fn with_roots(chromium_user_data: Vec<PathBuf>, firefox_profiles: Vec<PathBuf>) -> Self {
        Self {
            chromium_user_data,
            firefox_profiles,
        }
    }

    fn cache_roots(&self, policy: &SafetyPolicy) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        let options = glob::MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };

        for user_data in self.chromium_user_data.iter().filter(|d| d.is_dir()) {
            let base = glob::Pattern::escape(&user_data.to_string_lossy());
            for profile_pattern in ["Default", "Profile *"] {
                let pattern = format!("{}{}{}", base, std::path::MAIN_SEPARATOR, profile_pattern);
                match glob::glob_with(&pattern, options) {
                    Ok(profiles) => {
                        for profile in profiles.filter_map(|p| p.ok()).filter(|p| p.is_dir()) {
                            roots.extend(CHROMIUM_CACHE_DIRS.iter().map(|c| profile.join(c)));
                        }
                    }
                    Err(e) => policy.report_warning(format!(
                        "Skip browser profiles: {} ({})",
                        user_data.display(),
                        e
                    )),
                }
            }
        }

        for profiles_root in self.firefox_profiles.iter().filter(|d| d.is_dir()) {
            match std::fs::read_dir(profiles_root) {
                Ok(profiles) => {
                    let mut found: Vec<PathBuf> = profiles
                        .filter_map(|e| e.ok())
                        .map(|e| e.path())
                        .filter(|p| p.is_dir())
                        .map(|p| p.join("cache2"))
                        .collect();
                    found.sort();
                    roots.extend(found);
                }
                Err(e) => policy.report_warning(format!(
                    "Skip Firefox profiles: {} ({})",
                    profiles_root.display(),
                    e
                )),
            }
        }

        roots
    }
}

impl Discoverer for BrowserCacheDiscoverer {
    fn id(&self) -> &str {
        BROWSER_CACHE_ID
    }

    fn category(&self) -> &'static Category {
        &category::BROWSER_CACHE
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let scan = TreeScan {
            id: BROWSER_CACHE_ID,
            category: self.category(),
            file_label: "Browser cache file",
            dir_label: "cache folder",
            requires_elevation: false,
            requires_app_closed: true,
            temp_guards: false,
        };
        let now = Utc::now();
        let mut hits = GuardHits::default();
        let mut findings = Vec::new();

        for root in self.cache_roots(policy) {
            findings.extend(scan_existing_root(&scan, &root, policy, cancel, now, &mut hits)?);
        }

        Ok(findings)
    }
}

// ─── Crash reports ──────────────────────────────────────────────────────────

/// Archived and queued crash/error reports
#[derive(Debug, Clone)]
pub struct CrashReportDiscoverer {
    roots: Vec<PathBuf>,
}

impl CrashReportDiscoverer {
    pub fn from_env() -> Self {
        let roots = if cfg!(windows) {
            env_path("ProgramData")
                .map(|pd| {
                    let wer = pd.join("Microsoft").join("Windows").join("WER");
                    vec![wer.join("ReportArchive"), wer.join("ReportQueue")]
                })
                .unwrap_or_default()
        } else {
            vec![PathBuf::from("/var/crash")]
        };
        Self { roots }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl Discoverer for CrashReportDiscoverer {
    fn id(&self) -> &str {
        CRASH_REPORTS_ID
    }

    fn category(&self) -> &'static Category {
        &category::CRASH_REPORTS
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let scan = TreeScan {
            id: CRASH_REPORTS_ID,
            category: self.category(),
            file_label: "Error report file",
            dir_label: "report folder",
            requires_elevation: true,
            requires_app_closed: false,
            temp_guards: false,
        };
        let now = Utc::now();
        let mut hits = GuardHits::default();
        let mut findings = Vec::new();

        for root in &self.roots {
            findings.extend(scan_existing_root(&scan, root, policy, cancel, now, &mut hits)?);
        }

        Ok(findings)
    }
}

// ─── Trash ──────────────────────────────────────────────────────────────────

/// One empty-trash finding per drive whose trash holds anything
pub struct TrashDiscoverer {
    trash: Arc<dyn TrashBin>,
}

impl TrashDiscoverer {
    pub fn new(trash: Arc<dyn TrashBin>) -> Self {
        Self { trash }
    }
}

impl Discoverer for TrashDiscoverer {
    fn id(&self) -> &str {
        TRASH_ID
    }

    fn category(&self) -> &'static Category {
        &category::TRASH
    }

    fn scan(&self, policy: &mut SafetyPolicy, cancel: &CancelToken) -> Result<Vec<Finding>, ScanError> {
        let mut findings = Vec::new();

        for drive in self.trash.drives() {
            if cancel.is_canceled() {
                return Err(ScanError::Canceled);
            }

            // An unreadable trash is still offered; emptying it may work
            let (bytes, reason) = match self.trash.query(Some(drive.as_str())) {
                Ok(usage) if usage.items == 0 => continue,
                Ok(usage) => (usage.bytes, format!("Trash contains {} items.", usage.items)),
                Err(e) => {
                    policy.report_warning(format!("Trash query failed: {} ({})", drive, e));
                    (0, "Trash ready to empty.".to_string())
                }
            };

            policy.add_allowlist(TRASH_ID, [drive.as_str()]);
            findings.push(Finding {
                id: new_finding_id(TRASH_ID),
                category_id: category::TRASH.id.to_string(),
                discoverer_id: TRASH_ID.to_string(),
                drive_root: drive.clone(),
                path: Some(PathBuf::from(&drive)),
                size_bytes: bytes,
                last_write: None,
                confidence: Confidence::High,
                reason,
                requires_elevation: false,
                requires_app_closed: false,
                verb: CleanupVerb::EmptyTrash,
            });
        }

        Ok(findings)
    }
}
