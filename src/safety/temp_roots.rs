//! Sanity rules for temp directories before a discoverer registers them.

use super::policy::SafetyPolicy;
use super::rules::{eq_ignore_case, is_protected_path, normalize_root};

/// A user temp root must not be protected and must have a `temp`/`tmp`
/// segment somewhere in it.
pub fn is_safe_user_temp_root(root: &str, policy: &SafetyPolicy) -> bool {
    let Some(normalized) = try_normalize_root(root) else {
        return false;
    };
    if is_protected_path(root, policy) {
        return false;
    }
    contains_temp_segment(&normalized)
}

/// A system temp root must not be protected and must be the platform's
/// system temp directory.
pub fn is_safe_system_temp_root(root: &str, policy: &SafetyPolicy) -> bool {
    let Some(normalized) = try_normalize_root(root) else {
        return false;
    };
    if is_protected_path(root, policy) {
        return false;
    }
    let Some(expected) = system_temp_dir().and_then(|dir| try_normalize_root(&dir)) else {
        return false;
    };
    eq_ignore_case(&normalized, &expected)
}

/// `%windir%\Temp` on Windows, `/var/tmp` elsewhere
pub fn system_temp_dir() -> Option<String> {
    if cfg!(windows) {
        std::env::var("windir")
            .or_else(|_| std::env::var("SystemRoot"))
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(|d| format!("{}\\Temp", d.trim_end_matches(['\\', '/'])))
    } else {
        Some("/var/tmp".to_string())
    }
}

fn try_normalize_root(path: &str) -> Option<String> {
    if path.trim().is_empty() {
        None
    } else {
        Some(normalize_root(path))
    }
}

fn contains_temp_segment(normalized_root: &str) -> bool {
    normalized_root
        .split(['\\', '/'])
        .filter(|s| !s.is_empty())
        .any(|s| s.eq_ignore_ascii_case("temp") || s.eq_ignore_ascii_case("tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_temp_needs_temp_segment() {
        let policy = SafetyPolicy::new();
        assert!(is_safe_user_temp_root(r"C:\Users\Alice\AppData\Local\Temp", &policy));
        assert!(is_safe_user_temp_root("/tmp", &policy));
        assert!(is_safe_user_temp_root("/home/alice/TMP/", &policy));
        assert!(!is_safe_user_temp_root(r"C:\Users\Alice\AppData\Local", &policy));
        assert!(!is_safe_user_temp_root(r"C:\Users\Alice\Temporary", &policy));
        assert!(!is_safe_user_temp_root("", &policy));
    }

    #[test]
    fn test_protected_temp_root_rejected() {
        let mut policy = SafetyPolicy::new();
        policy.add_protected_prefix("/srv/tmp/");
        assert!(!is_safe_user_temp_root("/srv/tmp", &policy));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_temp_root() {
        let policy = SafetyPolicy::new();
        assert!(is_safe_system_temp_root("/var/tmp/", &policy));
        assert!(!is_safe_system_temp_root("/tmp", &policy));
    }
}
