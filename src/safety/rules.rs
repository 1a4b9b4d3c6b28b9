//! Pure path rules over a [`SafetyPolicy`].
//!
//! Paths are handled as text so that the same rules apply to Windows-style
//! (`C:\Users\...`, `\\server\share\...`) and POSIX-style paths regardless
//! of the host. Every comparison is case-insensitive.

use chrono::{DateTime, Duration, Utc};

use super::policy::SafetyPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Windows,
    Posix,
}

impl Style {
    fn of(path: &str) -> Style {
        if has_drive_prefix(path) || path.starts_with('\\') {
            Style::Windows
        } else if path.starts_with('/') {
            Style::Posix
        } else if path.contains('\\') {
            Style::Windows
        } else {
            Style::Posix
        }
    }

    fn sep(self) -> char {
        match self {
            Style::Windows => '\\',
            Style::Posix => '/',
        }
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Canonical absolute path with trailing separators stripped.
/// `C:\` becomes `C:` and `/` becomes the empty string.
pub fn normalize_path(path: &str) -> String {
    full_path(path).trim_end_matches(['/', '\\']).to_string()
}

/// Canonical absolute path with exactly one trailing separator, for
/// prefix comparisons that must not match similarly named siblings.
pub fn normalize_root(path: &str) -> String {
    let normalized = normalize_path(path);
    let sep = Style::of(&full_path(path)).sep();
    format!("{}{}", normalized, sep)
}

/// Root of the drive a path lives on: `C:\`, `\\server\share\` or `/`
pub fn path_root(path: &str) -> String {
    let full = full_path(path);
    match Style::of(&full) {
        Style::Posix => "/".to_string(),
        Style::Windows => {
            if has_drive_prefix(&full) {
                format!("{}\\", &full[..2])
            } else if let Some(rest) = full.strip_prefix(r"\\") {
                let parts: Vec<&str> = rest.splitn(3, '\\').take(2).collect();
                format!(r"\\{}\", parts.join("\\"))
            } else {
                "\\".to_string()
            }
        }
    }
}

pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Absolute form of `path` with `.`/`..` resolved and separators unified
fn full_path(path: &str) -> String {
    match Style::of(path) {
        Style::Posix => {
            if path.starts_with('/') {
                format!("/{}", resolve_segments(path, '/'))
            } else {
                match std::env::current_dir() {
                    Ok(cwd) => {
                        let cwd = cwd.to_string_lossy();
                        let sep = Style::of(&cwd).sep();
                        full_path(&format!("{}{}{}", cwd, sep, path))
                    }
                    Err(_) => format!("/{}", resolve_segments(path, '/')),
                }
            }
        }
        Style::Windows => {
            let unified = path.replace('/', "\\");
            if has_drive_prefix(&unified) {
                let (drive, rest) = unified.split_at(2);
                format!("{}\\{}", drive, resolve_segments(rest, '\\'))
            } else if let Some(rest) = unified.strip_prefix(r"\\") {
                let mut parts = rest.splitn(3, '\\');
                let server = parts.next().unwrap_or_default();
                let share = parts.next().unwrap_or_default();
                let tail = resolve_segments(parts.next().unwrap_or_default(), '\\');
                format!(r"\\{}\{}\{}", server, share, tail)
            } else if unified.starts_with('\\') {
                format!("\\{}", resolve_segments(&unified, '\\'))
            } else {
                match std::env::current_dir() {
                    Ok(cwd) => full_path(&format!("{}\\{}", cwd.to_string_lossy(), unified)),
                    Err(_) => format!("\\{}", resolve_segments(&unified, '\\')),
                }
            }
        }
    }
}

fn resolve_segments(path: &str, sep: char) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split(sep) {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }
    let mut joined = stack.join(&sep.to_string());
    if path.ends_with(sep) && !joined.is_empty() {
        joined.push(sep);
    }
    joined
}

/// True when `path` sits under one of the roots registered for the
/// discoverer in the current scan generation
pub fn is_under_allowlist(discoverer_id: &str, path: &str, policy: &SafetyPolicy) -> bool {
    let roots = policy.allowlist_roots(discoverer_id);
    if roots.is_empty() || path.trim().is_empty() {
        return false;
    }

    let normalized_path = normalize_path(path).to_lowercase();
    let normalized_path_root = normalize_root(path).to_lowercase();

    roots.iter().any(|root| {
        let normalized_root = normalize_root(root).to_lowercase();
        normalized_path.starts_with(&normalized_root) || normalized_path_root == normalized_root
    })
}

/// True when `path` matches any protected prefix. Protection is an
/// absolute veto over the allow-list.
pub fn is_protected_path(path: &str, policy: &SafetyPolicy) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    let normalized = normalize_root(path).to_lowercase();

    policy.protected_prefixes().iter().any(|pattern| {
        if pattern.trim().is_empty() {
            false
        } else if pattern.contains('*') {
            matches_wildcard_prefix(&normalized, pattern)
        } else {
            normalized.starts_with(&normalize_root(pattern).to_lowercase())
        }
    })
}

/// Allow-listed for the discoverer and not protected
pub fn is_allowed_path(discoverer_id: &str, path: &str, policy: &SafetyPolicy) -> bool {
    is_under_allowlist(discoverer_id, path, policy) && !is_protected_path(path, policy)
}

/// Old enough iff written at or before `now - retention`. Unknown write
/// times are never old enough.
pub fn is_old_enough(
    category_id: &str,
    last_write: Option<DateTime<Utc>>,
    policy: &SafetyPolicy,
    now: DateTime<Utc>,
) -> bool {
    let Some(last_write) = last_write else {
        return false;
    };

    let min_age = match policy.retention_days_for(category_id) {
        Some(days) => Duration::days(i64::from(days)),
        None => policy.min_age_default,
    };
    age_cutoff(now, min_age).is_some_and(|cutoff| last_write <= cutoff)
}

/// `now - span`, or `None` when that falls before the representable range.
/// A `None` cutoff means the window covers all of time.
pub fn age_cutoff(now: DateTime<Utc>, span: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(span)
}

/// True when `last_write` falls inside the `span` leading up to `now`
pub fn is_within(last_write: DateTime<Utc>, now: DateTime<Utc>, span: Duration) -> bool {
    age_cutoff(now, span).map_or(true, |cutoff| last_write >= cutoff)
}

/// Retention in whole days, for display
pub fn retention_days(category_id: &str, policy: &SafetyPolicy) -> u32 {
    policy.retention_days_for(category_id).unwrap_or_else(|| {
        let hours = policy.min_age_default.num_hours().max(0) as u32;
        hours.div_ceil(24)
    })
}

/// `prefix*suffix` match: the literal prefix must lead the path, then the
/// suffix (bounded by separators) must appear anywhere after it. This is
/// deliberately looser than a one-segment match.
fn matches_wildcard_prefix(normalized_path_lower: &str, pattern: &str) -> bool {
    let style = Style::of(pattern);
    let sep = style.sep();
    let unified = match style {
        Style::Windows => pattern.replace('/', "\\"),
        Style::Posix => pattern.to_string(),
    };
    let Some(star) = unified.find('*') else {
        return false;
    };

    let prefix = &unified[..star];
    let suffix = &unified[star + 1..];

    let normalized_prefix = if prefix.trim().is_empty() {
        String::new()
    } else {
        normalize_root(prefix).to_lowercase()
    };
    if !normalized_path_lower.starts_with(&normalized_prefix) {
        return false;
    }

    if suffix.is_empty() {
        return true;
    }

    let mut normalized_suffix = match style {
        Style::Windows => suffix.replace('/', "\\"),
        Style::Posix => suffix.to_string(),
    };
    if !normalized_suffix.starts_with(sep) {
        normalized_suffix.insert(0, sep);
    }
    if !normalized_suffix.ends_with(sep) {
        normalized_suffix.push(sep);
    }

    normalized_path_lower[normalized_prefix.len()..].contains(&normalized_suffix.to_lowercase())
}
