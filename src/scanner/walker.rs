use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::common::errors::ScanError;
use crate::common::CancelToken;
use crate::safety::SafetyPolicy;

/// One removable entry under a scanned root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    /// Only empty directories are ever yielded
    pub is_dir: bool,
}

/// Enumerate files and empty directories under `root`.
///
/// The root itself is never yielded. Symlinked directories are neither
/// followed nor yielded. Unreadable entries become policy warnings rather
/// than errors; only cancellation stops the walk.
pub fn enumerate_entries(
    root: &Path,
    policy: &SafetyPolicy,
    cancel: &CancelToken,
) -> Result<Vec<Entry>, ScanError> {
    let mut entries = Vec::new();

    for result in WalkDir::new(root).follow_links(false) {
        if cancel.is_canceled() {
            return Err(ScanError::Canceled);
        }

        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                policy.report_warning(format!("Skip entry: {} ({})", path, err));
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            match std::fs::read_dir(path) {
                Ok(mut children) => {
                    if children.next().is_none() {
                        entries.push(Entry {
                            path: path.to_path_buf(),
                            is_dir: true,
                        });
                    }
                }
                Err(err) => {
                    policy.report_warning(format!("Skip entry: {} ({})", path.display(), err));
                }
            }
        } else if file_type.is_symlink() {
            // A link to a directory is a reparse point; never descend or yield
            let points_at_dir = std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false);
            if !points_at_dir {
                entries.push(Entry {
                    path: path.to_path_buf(),
                    is_dir: false,
                });
            }
        } else {
            entries.push(Entry {
                path: path.to_path_buf(),
                is_dir: false,
            });
        }
    }

    Ok(entries)
}

/// Total logical size of the files under a path
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().map(|m| m.len()).unwrap_or(0))
        .sum()
}

/// Number of entries directly inside a directory
pub fn child_count(path: &Path) -> usize {
    std::fs::read_dir(path).map(|rd| rd.count()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_yields_files_and_empty_dirs_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.tmp"), b"aaa").unwrap();
        fs::create_dir_all(root.join("full/inner")).unwrap();
        fs::write(root.join("full/inner/b.tmp"), b"b").unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        let policy = SafetyPolicy::new();
        let mut entries = enumerate_entries(root, &policy, &CancelToken::new()).unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let got: Vec<(PathBuf, bool)> = entries.into_iter().map(|e| (e.path, e.is_dir)).collect();
        assert_eq!(
            got,
            vec![
                (root.join("a.tmp"), false),
                (root.join("empty"), true),
                (root.join("full/inner/b.tmp"), false),
            ]
        );
    }

    #[test]
    fn test_empty_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let entries = enumerate_entries(dir.path(), &SafetyPolicy::new(), &CancelToken::new()).unwrap();
        assert!(entries.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_not_followed() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("precious.txt"), b"keep").unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let entries = enumerate_entries(dir.path(), &SafetyPolicy::new(), &CancelToken::new()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_cancel_stops_walk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"a").unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = enumerate_entries(dir.path(), &SafetyPolicy::new(), &cancel);
        assert!(matches!(result, Err(ScanError::Canceled)));
    }

    #[test]
    fn test_dir_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 100]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b"), vec![0u8; 50]).unwrap();
        assert_eq!(dir_size(dir.path()), 150);
        assert_eq!(child_count(dir.path()), 2);
    }
}
