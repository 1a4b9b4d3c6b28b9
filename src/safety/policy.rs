use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::model::category;

/// Operator-facing safety settings. Stable across scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Minimum age for categories without an explicit retention entry
    #[serde(default = "default_min_age_hours")]
    pub min_age_default_hours: u32,

    /// Temp files written within this window are never removed
    #[serde(default = "default_recent_guard_hours")]
    pub recent_file_guard_hours: u32,

    #[serde(default = "default_true")]
    pub compatibility_mode_enabled: bool,

    /// Installer-like temp files written within this window are kept
    #[serde(default = "default_installer_guard_days")]
    pub compatibility_installer_guard_days: u32,

    /// Additional protected prefixes (single `*` segment allowed)
    #[serde(default)]
    pub extra_protected_paths: Vec<String>,

    /// Retention in days, keyed by category id
    #[serde(default = "default_retention_days")]
    pub retention_days: BTreeMap<String, u32>,
}

fn default_min_age_hours() -> u32 {
    24
}
fn default_recent_guard_hours() -> u32 {
    48
}
fn default_true() -> bool {
    true
}
fn default_installer_guard_days() -> u32 {
    14
}
fn default_retention_days() -> BTreeMap<String, u32> {
    category::ALL
        .iter()
        .map(|c| c.id)
        .chain(std::iter::once("logs.system"))
        .map(|id| (id.to_string(), 7))
        .collect()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_age_default_hours: default_min_age_hours(),
            recent_file_guard_hours: default_recent_guard_hours(),
            compatibility_mode_enabled: default_true(),
            compatibility_installer_guard_days: default_installer_guard_days(),
            extra_protected_paths: Vec::new(),
            retention_days: default_retention_days(),
        }
    }
}

const DEFAULT_PROTECTED_PREFIXES: &[&str] = &[
    r"C:\Windows\System32\",
    r"C:\Windows\WinSxS\",
    r"C:\Program Files\",
    r"C:\Program Files (x86)\",
    r"C:\Users\*\Documents\",
    r"C:\Users\*\Desktop\",
    "/bin/",
    "/sbin/",
    "/usr/",
    "/etc/",
    "/boot/",
    "/System/",
    "/Applications/",
    "/home/*/Documents/",
    "/home/*/Desktop/",
    "/Users/*/Documents/",
    "/Users/*/Desktop/",
];

/// One instance per session: configuration plus per-scan state.
///
/// Allow-list registration takes `&mut self` and happens during discovery,
/// which completes before any cleanup reads it. Warnings are appended
/// through `&self` so validators and actions running on worker threads can
/// report too.
#[derive(Debug)]
pub struct SafetyPolicy {
    pub min_age_default: Duration,
    pub recent_file_guard_hours: u32,
    pub compatibility_mode_enabled: bool,
    pub compatibility_installer_guard_days: u32,
    retention_days: HashMap<String, u32>,
    protected_prefixes: Vec<String>,
    allowlist: HashMap<String, Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}

impl SafetyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        let mut policy = Self {
            min_age_default: Duration::hours(i64::from(config.min_age_default_hours)),
            recent_file_guard_hours: config.recent_file_guard_hours,
            compatibility_mode_enabled: config.compatibility_mode_enabled,
            compatibility_installer_guard_days: config.compatibility_installer_guard_days,
            retention_days: HashMap::new(),
            protected_prefixes: Vec::new(),
            allowlist: HashMap::new(),
            warnings: Mutex::new(Vec::new()),
        };

        for (category_id, days) in &config.retention_days {
            policy.set_retention_days(category_id, *days);
        }
        for prefix in DEFAULT_PROTECTED_PREFIXES {
            policy.add_protected_prefix(prefix);
        }
        for prefix in environment_protected_prefixes() {
            policy.add_protected_prefix(&prefix);
        }
        for prefix in &config.extra_protected_paths {
            policy.add_protected_prefix(prefix);
        }

        policy
    }

    // ─── Configuration ──────────────────────────────────────────────────────

    pub fn retention_days_for(&self, category_id: &str) -> Option<u32> {
        self.retention_days
            .get(&category_id.to_lowercase())
            .copied()
    }

    pub fn set_retention_days(&mut self, category_id: &str, days: u32) {
        self.retention_days.insert(category_id.to_lowercase(), days);
    }

    pub fn clear_retention_days(&mut self, category_id: &str) {
        self.retention_days.remove(&category_id.to_lowercase());
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    /// Add a protected prefix; duplicates (ignoring case) are dropped
    pub fn add_protected_prefix(&mut self, prefix: &str) {
        if prefix.trim().is_empty() {
            return;
        }
        if !self.is_protected_prefix(prefix) {
            self.protected_prefixes.push(prefix.to_string());
        }
    }

    pub fn is_protected_prefix(&self, prefix: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|p| p.to_lowercase() == prefix.to_lowercase())
    }

    // ─── Per-scan state ─────────────────────────────────────────────────────

    /// Permit destructive action under `roots` for this discoverer
    pub fn add_allowlist<I, S>(&mut self, discoverer_id: &str, roots: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = self
            .allowlist
            .entry(discoverer_id.to_lowercase())
            .or_default();
        for root in roots {
            let root = root.as_ref();
            if !root.trim().is_empty() {
                list.push(root.to_string());
            }
        }
    }

    pub fn allowlist_roots(&self, discoverer_id: &str) -> &[String] {
        self.allowlist
            .get(&discoverer_id.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn allowlist_is_empty(&self) -> bool {
        self.allowlist.values().all(Vec::is_empty)
    }

    pub fn report_warning(&self, message: impl Into<String>) {
        let message = message.into();
        if message.trim().is_empty() {
            return;
        }
        tracing::debug!(warning = %message, "policy warning");
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Snapshot of the warnings accumulated so far
    pub fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_warnings(&self) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Forget allow-list and warnings from the previous scan.
    /// Configuration is untouched.
    pub fn reset_for_scan(&mut self) {
        self.allowlist.clear();
        self.clear_warnings();
    }
}

/// Protected prefixes resolved from the running environment
fn environment_protected_prefixes() -> Vec<String> {
    let mut prefixes = Vec::new();

    let windows_dir = std::env::var("windir")
        .or_else(|_| std::env::var("SystemRoot"))
        .ok()
        .filter(|d| !d.trim().is_empty());
    if let Some(windows_dir) = windows_dir {
        prefixes.push(join_dir(&windows_dir, "System32"));
        prefixes.push(join_dir(&windows_dir, "WinSxS"));
    }

    for var in ["ProgramFiles", "ProgramFiles(x86)"] {
        if let Ok(dir) = std::env::var(var) {
            if !dir.trim().is_empty() {
                prefixes.push(ensure_trailing_separator(&dir));
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        let home = home.to_string_lossy().into_owned();
        if let Some(profiles_root) = Path::new(&home).parent() {
            let profiles_root = profiles_root.to_string_lossy();
            if !profiles_root.is_empty() {
                prefixes.push(join_dir(&join_dir(&profiles_root, "*"), "Documents"));
                prefixes.push(join_dir(&join_dir(&profiles_root, "*"), "Desktop"));
            }
        }
        prefixes.push(join_dir(&home, "Documents"));
        prefixes.push(join_dir(&home, "Desktop"));
    }

    // Unconfigured XDG user dirs fall back to $HOME itself
    let home = dirs::home_dir();
    for dir in [dirs::document_dir(), dirs::desktop_dir()].into_iter().flatten() {
        if home.as_ref() != Some(&dir) {
            prefixes.push(ensure_trailing_separator(&dir.to_string_lossy()));
        }
    }

    prefixes
}

fn join_dir(base: &str, child: &str) -> String {
    format!("{}{}{}", ensure_trailing_separator(base), child, std::path::MAIN_SEPARATOR)
}

fn ensure_trailing_separator(path: &str) -> String {
    if path.ends_with(['/', '\\']) {
        path.to_string()
    } else {
        format!("{}{}", path, std::path::MAIN_SEPARATOR)
    }
}
