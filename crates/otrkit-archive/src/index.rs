//! Path and content-hash index shared by all archive backends.

use glob::{MatchOptions, Pattern};
use hashbrown::HashMap;
use otrkit_common::hash;
use rustc_hash::FxBuildHasher;

use crate::Result;

pub(crate) type FxHashMap<K, V> = HashMap<K, V, FxBuildHasher>;

/// Index from normalised logical path to a backend-specific location, plus a
/// content-hash table for reverse lookups.
#[derive(Debug, Clone)]
pub struct ArchiveIndex<L> {
    entries: FxHashMap<String, L>,
    hashes: FxHashMap<u64, String>,
}

impl<L> Default for ArchiveIndex<L> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            hashes: FxHashMap::default(),
        }
    }
}

impl<L> ArchiveIndex<L> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Returns the normalised path.
    pub fn insert(&mut self, path: &str, location: L) -> String {
        let path = hash::normalize_path(path).into_owned();
        self.hashes.insert(hash::content_hash(&path), path.clone());
        self.entries.insert(path.clone(), location);
        path
    }

    /// Remove an entry.
    pub fn remove(&mut self, path: &str) -> Option<L> {
        let path = hash::normalize_path(path);
        self.hashes.remove(&hash::content_hash(&path));
        self.entries.remove(path.as_ref())
    }

    /// Look up the location of a path.
    #[inline]
    pub fn get(&self, path: &str) -> Option<&L> {
        self.entries.get(hash::normalize_path(path).as_ref())
    }

    /// Check whether a path is indexed.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Resolve a content hash to its path.
    #[inline]
    pub fn path_for_hash(&self, hash: u64) -> Option<&str> {
        self.hashes.get(&hash).map(String::as_str)
    }

    /// Iterate over all indexed paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of indexed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A directory-style search mask such as `objects/gameplay_keep/*`.
///
/// Supports `*`, `?` and `[...]`. A `*` also matches across `/`, so
/// `textures/*` selects every file below `textures`.
#[derive(Debug, Clone)]
pub struct FileMask {
    pattern: Pattern,
}

impl FileMask {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    /// Compile a mask.
    pub fn new(mask: &str) -> Result<Self> {
        let mask = hash::normalize_path(mask);
        Ok(Self {
            pattern: Pattern::new(&mask)?,
        })
    }

    /// Check whether a logical path matches.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern
            .matches_with(&hash::normalize_path(path), Self::OPTIONS)
    }

    /// Filter and sort a set of paths.
    pub fn select<'a>(&self, paths: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut selected: Vec<String> = paths
            .filter(|path| self.matches(path))
            .map(str::to_owned)
            .collect();
        selected.sort_unstable();
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_normalises_and_hashes() {
        let mut index = ArchiveIndex::new();
        let path = index.insert("\\objects\\obj_box\\gBoxDL", 3usize);
        assert_eq!(path, "objects/obj_box/gBoxDL");
        assert_eq!(index.get("objects/obj_box/gBoxDL"), Some(&3));
        assert_eq!(
            index.path_for_hash(hash::content_hash("objects/obj_box/gBoxDL")),
            Some("objects/obj_box/gBoxDL")
        );

        assert_eq!(index.remove("/objects/obj_box/gBoxDL"), Some(3));
        assert!(index.is_empty());
        assert!(index
            .path_for_hash(hash::content_hash("objects/obj_box/gBoxDL"))
            .is_none());
    }

    #[test]
    fn test_mask_crosses_directories() {
        let mask = FileMask::new("objects/gameplay_keep/*").unwrap();
        assert!(mask.matches("objects/gameplay_keep/gLinkDL"));
        assert!(mask.matches("objects/gameplay_keep/sub/tex"));
        assert!(!mask.matches("objects/gameplay_field_keep/tex"));
    }

    #[test]
    fn test_mask_select_sorted() {
        let mask = FileMask::new("a/?").unwrap();
        let selected = mask.select(["a/c", "a/b", "a/bb", "b/a"].into_iter());
        assert_eq!(selected, vec!["a/b".to_string(), "a/c".to_string()]);
    }

    #[test]
    fn test_invalid_mask() {
        assert!(FileMask::new("a/[").is_err());
    }
}
