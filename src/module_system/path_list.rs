// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Ordered search path for non-relative identifiers

use std::path::{Path, PathBuf};

/// Environment variable naming extra search directories, colon-separated.
pub const SEARCH_PATH_ENV: &str = "SKIFF_PATH";

/// Fixed installation directory, always last in the search order and the
/// only entry in secure mode.
pub const INSTALL_DIR: &str = "/usr/local/lib/skiff";

/// Search directory under the user's home directory.
const HOME_SUBDIR: &str = ".skiff/lib";

/// Ordered, index-stable sequence of search directories.
///
/// Insertion order defines search priority. Deleting an entry clears its
/// slot rather than shrinking the sequence, so indices handed to hosted code
/// stay valid across deletions.
#[derive(Debug, Default)]
pub struct PathList {
    entries: Vec<Option<PathBuf>>,
}

impl PathList {
    /// Create an empty path list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the initial search path.
    ///
    /// Priority order: `SKIFF_PATH` entries, the working directory (the
    /// literal `.`), the user's `~/.skiff/lib` when a home directory is
    /// known, and finally [`INSTALL_DIR`]. In secure mode only the
    /// installation directory is included.
    pub(crate) fn populate(secure: bool) -> Self {
        let mut list = Self::new();
        if secure {
            list.append(INSTALL_DIR);
            return list;
        }
        if let Ok(raw) = std::env::var(SEARCH_PATH_ENV) {
            for part in raw.split(':').filter(|p| !p.is_empty()) {
                let path = Path::new(part);
                if path.is_absolute() || part == "." {
                    list.append(path);
                } else if let Ok(cwd) = std::env::current_dir() {
                    // Relative env entries are anchored once, at startup
                    list.append(cwd.join(path));
                }
            }
        }
        list.append(".");
        if let Some(home) = dirs::home_dir() {
            list.append(home.join(HOME_SUBDIR));
        }
        list.append(INSTALL_DIR);
        list
    }

    /// Append a directory, returning its index.
    pub fn append(&mut self, path: impl Into<PathBuf>) -> usize {
        self.entries.push(Some(path.into()));
        self.entries.len() - 1
    }

    /// Get the directory at `index`, if the slot exists and is occupied.
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.entries.get(index)?.as_deref()
    }

    /// Set the directory at `index`, extending the sequence with cleared
    /// slots as needed.
    pub fn set(&mut self, index: usize, path: impl Into<PathBuf>) {
        if index >= self.entries.len() {
            self.entries.resize(index + 1, None);
        }
        self.entries[index] = Some(path.into());
    }

    /// Clear the slot at `index`. Returns `true` if it was occupied.
    /// The slot remains addressable; later indices do not shift.
    pub fn delete(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    /// Enumerate occupied slots in priority order as `(index, path)` pairs.
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, &Path)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_deref().map(|p| (i, p)))
    }

    /// Total number of slots, including cleared ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_get() {
        let mut paths = PathList::new();
        assert_eq!(paths.append("/a"), 0);
        assert_eq!(paths.append("/b"), 1);
        assert_eq!(paths.get(0), Some(Path::new("/a")));
        assert_eq!(paths.get(1), Some(Path::new("/b")));
        assert_eq!(paths.get(2), None);
    }

    #[test]
    fn test_delete_preserves_indices() {
        let mut paths = PathList::new();
        paths.append("/a");
        paths.append("/b");
        paths.append("/c");

        assert!(paths.delete(1));
        assert!(!paths.delete(1));
        assert_eq!(paths.get(1), None);
        assert_eq!(paths.get(2), Some(Path::new("/c")));
        assert_eq!(paths.len(), 3);

        let entries: Vec<_> = paths.enumerate().collect();
        assert_eq!(
            entries,
            vec![(0, Path::new("/a")), (2, Path::new("/c"))]
        );
    }

    #[test]
    fn test_set_extends_with_cleared_slots() {
        let mut paths = PathList::new();
        paths.append("/a");
        paths.set(3, "/d");
        assert_eq!(paths.len(), 4);
        assert_eq!(paths.get(1), None);
        assert_eq!(paths.get(2), None);
        assert_eq!(paths.get(3), Some(Path::new("/d")));
    }

    #[test]
    fn test_secure_population_is_install_dir_only() {
        let paths = PathList::populate(true);
        let entries: Vec<_> = paths.enumerate().collect();
        assert_eq!(entries, vec![(0, Path::new(INSTALL_DIR))]);
    }

    #[test]
    fn test_default_population_ends_with_install_dir() {
        let paths = PathList::populate(false);
        let entries: Vec<_> = paths.enumerate().map(|(_, p)| p).collect();
        assert!(entries.contains(&Path::new(".")));
        assert_eq!(entries.last(), Some(&Path::new(INSTALL_DIR)));
    }
}
