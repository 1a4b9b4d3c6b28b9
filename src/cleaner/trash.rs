use std::io;
use std::path::{Path, PathBuf};

use crate::safety::rules::{eq_ignore_case, path_root};
use crate::scanner::walker::{child_count, dir_size};

/// Space held by a trash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TrashUsage {
    pub bytes: u64,
    pub items: u64,
}

/// OS trash capability. `root` selects one drive's trash; `None` means
/// every drive the trash covers.
pub trait TrashBin: Send + Sync {
    /// Move one file or empty directory into the trash
    fn send(&self, path: &Path) -> io::Result<()>;

    fn query(&self, root: Option<&str>) -> io::Result<TrashUsage>;

    fn empty(&self, root: Option<&str>) -> io::Result<()>;

    /// Drive roots this trash holds content for
    fn drives(&self) -> Vec<String>;
}

/// Directory-backed trash. Every `send` gets its own slot so names never
/// collide; the slot keeps the original file name.
#[derive(Debug, Clone)]
pub struct StagingTrash {
    dir: PathBuf,
}

impl StagingTrash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn drive(&self) -> String {
        path_root(&self.dir.to_string_lossy())
    }

    fn covers(&self, root: Option<&str>) -> bool {
        match root {
            None => true,
            Some(r) => eq_ignore_case(&path_root(r), &self.drive()),
        }
    }
}

impl TrashBin for StagingTrash {
    fn send(&self, path: &Path) -> io::Result<()> {
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

        let slot = self.dir.join(uuid::Uuid::new_v4().simple().to_string());
        std::fs::create_dir_all(&slot)?;
        let staged = slot.join(name);

        // Try rename first (fast, same filesystem)
        match std::fs::rename(path, &staged) {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => copy_then_remove(path, &staged).inspect_err(|_| {
                let _ = std::fs::remove_dir_all(&slot);
            }),
            Err(e) => {
                let _ = std::fs::remove_dir_all(&slot);
                Err(e)
            }
        }
    }

    fn query(&self, root: Option<&str>) -> io::Result<TrashUsage> {
        if !self.covers(root) || !self.dir.exists() {
            return Ok(TrashUsage::default());
        }
        Ok(TrashUsage {
            bytes: dir_size(&self.dir),
            items: child_count(&self.dir) as u64,
        })
    }

    fn empty(&self, root: Option<&str>) -> io::Result<()> {
        if !self.covers(root) || !self.dir.exists() {
            return Ok(());
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_dir() {
                std::fs::remove_dir_all(&path)?;
            } else {
                std::fs::remove_file(&path)?;
            }
        }
        tracing::debug!(dir = %self.dir.display(), "trash emptied");
        Ok(())
    }

    fn drives(&self) -> Vec<String> {
        vec![self.drive()]
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(windows)]
    const NOT_SAME_DEVICE: i32 = 17;
    #[cfg(not(windows))]
    const NOT_SAME_DEVICE: i32 = 18;

    err.raw_os_error() == Some(NOT_SAME_DEVICE)
}

/// Fallback for cross-filesystem moves
fn copy_then_remove(original: &Path, staged: &Path) -> io::Result<()> {
    if original.is_dir() {
        std::fs::create_dir_all(staged)?;
        std::fs::remove_dir(original)
    } else {
        std::fs::copy(original, staged)?;
        std::fs::remove_file(original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_send_query_empty() {
        let home = tempfile::tempdir().unwrap();
        let trash = StagingTrash::new(home.path().join("trash"));

        let victim = home.path().join("a.tmp");
        fs::write(&victim, vec![1u8; 64]).unwrap();
        trash.send(&victim).unwrap();
        assert!(!victim.exists());

        let usage = trash.query(None).unwrap();
        assert_eq!(usage, TrashUsage { bytes: 64, items: 1 });

        trash.empty(None).unwrap();
        assert_eq!(trash.query(None).unwrap(), TrashUsage::default());
    }

    #[test]
    fn test_same_name_twice_does_not_collide() {
        let home = tempfile::tempdir().unwrap();
        let trash = StagingTrash::new(home.path().join("trash"));
        for _ in 0..2 {
            let victim = home.path().join("dup.log");
            fs::write(&victim, b"x").unwrap();
            trash.send(&victim).unwrap();
        }
        assert_eq!(trash.query(None).unwrap().items, 2);
    }

    #[test]
    fn test_send_missing_path_is_not_found() {
        let home = tempfile::tempdir().unwrap();
        let trash = StagingTrash::new(home.path().join("trash"));
        let err = trash.send(&home.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(trash.query(None).unwrap().items, 0);
    }

    #[test]
    fn test_query_other_drive_is_empty() {
        let home = tempfile::tempdir().unwrap();
        let trash = StagingTrash::new(home.path().join("trash"));
        let victim = home.path().join("a");
        fs::write(&victim, b"abc").unwrap();
        trash.send(&victim).unwrap();

        assert_eq!(trash.query(Some(r"Q:\")).unwrap(), TrashUsage::default());
        assert_eq!(trash.drives().len(), 1);
    }
}
