//! On-disk file identity, used to notice that a path now names a different file.

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Identity of an on-disk file: device and inode on Unix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    #[cfg(unix)]
    device: u64,
    #[cfg(unix)]
    inode: u64,
    #[cfg(not(unix))]
    created: Option<std::time::SystemTime>,
}

impl FileIdentity {
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        }
    }

    // Best effort where inodes are not exposed on stable Rust.
    #[cfg(not(unix))]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            created: metadata.created().ok(),
        }
    }

    /// Identity of whatever `path` currently refers to, following symlinks.
    pub fn of_path(path: &Path) -> io::Result<Self> {
        Ok(Self::from_metadata(&std::fs::metadata(path)?))
    }
}

/// True when `path` is gone, is no longer a regular file, or names another file.
pub(crate) fn has_rotated(path: &Path, identity: FileIdentity) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => !metadata.is_file() || FileIdentity::from_metadata(&metadata) != identity,
        // Removed between checks, or unreadable: both count as a change.
        Err(_) => true,
    }
}
