use serde::{Deserialize, Serialize};

/// How risky it is to remove content in a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// A fixed class of disposable content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_enabled: bool,
    pub risk: RiskLevel,
}

pub const USER_TEMP: Category = Category {
    id: "temp.user",
    name: "User Temp Files",
    description: "Safe temp files in the current user profile.",
    default_enabled: true,
    risk: RiskLevel::Low,
};

pub const SYSTEM_TEMP: Category = Category {
    id: "temp.system",
    name: "System Temp Files",
    description: "Safe temp files in the system temp directory.",
    default_enabled: false,
    risk: RiskLevel::Medium,
};

pub const UPDATE_CACHE: Category = Category {
    id: "cache.windows-update",
    name: "Windows Update Cache",
    description: "Safe Windows Update cache files.",
    default_enabled: false,
    risk: RiskLevel::Medium,
};

pub const THUMBNAIL_CACHE: Category = Category {
    id: "cache.thumbnails",
    name: "Thumbnail Cache",
    description: "Thumbnail cache database files.",
    default_enabled: true,
    risk: RiskLevel::Low,
};

pub const SHADER_CACHE: Category = Category {
    id: "cache.directx-shader",
    name: "DirectX Shader Cache",
    description: "DirectX shader cache files (safe to rebuild).",
    default_enabled: true,
    risk: RiskLevel::Low,
};

pub const BROWSER_CACHE: Category = Category {
    id: "cache.browser",
    name: "Browser Cache",
    description: "Browser cache files (requires browser closed).",
    default_enabled: false,
    risk: RiskLevel::Medium,
};

pub const CRASH_REPORTS: Category = Category {
    id: "reports.wer",
    name: "Crash Reports",
    description: "Crash and error report archives and queues.",
    default_enabled: true,
    risk: RiskLevel::Low,
};

pub const TRASH: Category = Category {
    id: "recyclebin",
    name: "Trash",
    description: "Empty the trash (irreversible).",
    default_enabled: false,
    risk: RiskLevel::Medium,
};

/// Every category the engine knows about, in display order
pub const ALL: &[Category] = &[
    USER_TEMP,
    SYSTEM_TEMP,
    UPDATE_CACHE,
    THUMBNAIL_CACHE,
    SHADER_CACHE,
    BROWSER_CACHE,
    CRASH_REPORTS,
    TRASH,
];

/// Look up a category by id (case-insensitive)
pub fn find(id: &str) -> Option<&'static Category> {
    ALL.iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

/// Temp categories get the recent-file and compatibility guards
pub fn is_temp(id: &str) -> bool {
    id.eq_ignore_ascii_case(USER_TEMP.id) || id.eq_ignore_ascii_case(SYSTEM_TEMP.id)
}
