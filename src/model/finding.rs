use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The physical removal verb recommended for a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupVerb {
    /// Move to the trash, recoverable until the trash is emptied
    MoveToTrash,
    /// Remove immediately, no undo
    PermanentDelete,
    /// Empty one drive's trash; the finding's path is the drive root
    EmptyTrash,
}

impl CleanupVerb {
    /// Stable id, matched against an action's id
    pub fn id(&self) -> &'static str {
        match self {
            CleanupVerb::MoveToTrash => "move-to-trash",
            CleanupVerb::PermanentDelete => "permanent-delete",
            CleanupVerb::EmptyTrash => "empty-trash",
        }
    }
}

impl std::fmt::Display for CleanupVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// How sure the discoverer is that the content is disposable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One unit of disposable content found during a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Unique per scan, opaque
    pub id: String,

    pub category_id: String,

    /// Discoverer that produced this finding; keys the allow-list
    pub discoverer_id: String,

    /// Root of the drive the content lives on
    pub drive_root: String,

    /// Absent only for abstract targets
    pub path: Option<PathBuf>,

    pub size_bytes: u64,

    /// Last write time observed at scan time
    pub last_write: Option<DateTime<Utc>>,

    pub confidence: Confidence,

    /// Human-readable reason this is flagged
    pub reason: String,

    pub requires_elevation: bool,

    pub requires_app_closed: bool,

    pub verb: CleanupVerb,
}

impl Finding {
    /// Copy of this finding with a different removal verb.
    /// Id and path are carried over untouched.
    pub fn with_verb(&self, verb: CleanupVerb) -> Finding {
        Finding {
            verb,
            ..self.clone()
        }
    }

    pub fn path_str(&self) -> Option<String> {
        self.path.as_deref().map(|p| p.to_string_lossy().into_owned())
    }
}

/// Map a finding onto the user's trash-or-permanent choice.
///
/// Empty-trash findings are left alone; everything else is rewritten to
/// `MoveToTrash` or `PermanentDelete`.
pub fn apply_cleanup_decision(finding: &Finding, use_trash: bool) -> Finding {
    if finding.verb == CleanupVerb::EmptyTrash {
        return finding.clone();
    }

    let verb = if use_trash {
        CleanupVerb::MoveToTrash
    } else {
        CleanupVerb::PermanentDelete
    };

    if finding.verb == verb {
        return finding.clone();
    }

    finding.with_verb(verb)
}
