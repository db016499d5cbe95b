//! Hashing utilities for path checksums.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::util::fs::relative_path;

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short checksum of a file's directory, relative to a base directory.
///
/// Generated resource translation units land in a per-source-directory
/// subfolder of the build dir so that equally named resource files from
/// different directories do not collide. The fragment depends only on the
/// relative directory, keeping it stable when the tree is relocated.
pub fn path_checksum(base: &Path, file: &Path) -> String {
    let parent = file.parent().unwrap_or(file);
    let rel = relative_path(base, parent);
    let digest = sha256_str(&rel.to_string_lossy());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sha256_str() {
        assert_eq!(
            sha256_str("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_path_checksum_is_stable() {
        let base = PathBuf::from("/project");
        let file = PathBuf::from("/project/res/icons.qrc");
        let a = path_checksum(&base, &file);
        let b = path_checksum(&base, &file);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn test_path_checksum_differs_per_directory() {
        let base = PathBuf::from("/project");
        let a = path_checksum(&base, &PathBuf::from("/project/res/data.qrc"));
        let b = path_checksum(&base, &PathBuf::from("/project/extra/data.qrc"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_path_checksum_ignores_base_location() {
        let a = path_checksum(
            &PathBuf::from("/home/a/project"),
            &PathBuf::from("/home/a/project/res/data.qrc"),
        );
        let b = path_checksum(
            &PathBuf::from("/home/b/project"),
            &PathBuf::from("/home/b/project/res/data.qrc"),
        );
        assert_eq!(a, b);
    }
}
