//! Content hashing of logical asset paths.
//!
//! Every asset is addressable either by its logical path or by a stable 64-bit
//! digest of that path. The digest is XXH3-64 over the normalised path bytes.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Normalise a logical path: forward slashes, no leading separator.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim_start_matches(['/', '\\']);
    if trimmed.contains('\\') {
        Cow::Owned(trimmed.replace('\\', "/"))
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Turn a logical path into a relative filesystem path that cannot leave
/// the directory it is joined onto.
///
/// Returns `None` for empty paths and for paths with `..`, root or drive
/// prefix components.
pub fn enclosed_path(path: &str) -> Option<PathBuf> {
    let normalized = normalize_path(path);
    let mut enclosed = PathBuf::new();
    for component in Path::new(normalized.as_ref()).components() {
        match component {
            Component::Normal(part) => enclosed.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!enclosed.as_os_str().is_empty()).then_some(enclosed)
}

/// Compute the content hash of a logical path.
///
/// The path is normalised first, so `textures\\a` and `/textures/a` hash the same.
#[inline]
pub fn content_hash(path: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(normalize_path(path).as_bytes())
}

/// Compute the hash of raw bytes.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_path("/objects\\gameplay_keep\\dl"), "objects/gameplay_keep/dl");
        assert!(matches!(normalize_path("a/b"), Cow::Borrowed("a/b")));
    }

    #[test]
    fn test_enclosed_path() {
        assert_eq!(
            enclosed_path("/objects\\obj/./gDL"),
            Some(PathBuf::from("objects/obj/gDL"))
        );
        assert_eq!(enclosed_path("../escaped.bin"), None);
        assert_eq!(enclosed_path("objects/../../x"), None);
        assert_eq!(enclosed_path("..\\x"), None);
        assert_eq!(enclosed_path(""), None);
        assert_eq!(enclosed_path("./"), None);
    }

    #[test]
    fn test_hash_ignores_separator_style() {
        assert_eq!(content_hash("textures\\a"), content_hash("/textures/a"));
        assert_ne!(content_hash("textures/a"), content_hash("textures/b"));
    }

    #[test]
    fn test_hash_matches_bytes() {
        assert_eq!(content_hash("a/b"), hash_bytes(b"a/b"));
    }
}
