// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Module factory: turns `(identifier, directory)` into a cached record

use crate::module_system::cache::ModuleCache;
use crate::module_system::record::ModuleRecord;
use libloading::Library;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File extension for script artifacts.
pub const SCRIPT_EXTENSION: &str = "js";

/// File extension for native extension artifacts on this platform.
pub const NATIVE_EXTENSION: &str = std::env::consts::DLL_EXTENSION;

enum Candidate {
    Script(PathBuf),
    Native(PathBuf),
}

/// Constructs module records and owns the module cache.
///
/// Every lookup miss (nonexistent candidate, non-regular file, a library
/// that will not open) is a "not found in this directory" signal, never an
/// error: the orchestrator keeps scanning the remaining search directories.
/// Once an artifact is confirmed present, later failures (compile errors,
/// ABI mismatch, initializer failure) are terminal for the resolution.
#[derive(Default)]
pub struct ModuleFactory {
    cache: ModuleCache,
}

impl ModuleFactory {
    /// Create a factory with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache, keyed by canonical path.
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Attempt to construct (or fetch) a record for `identifier` inside
    /// `directory`. `None` means not found here; the caller should try the
    /// next search directory.
    ///
    /// Script candidates take priority over native ones.
    pub fn resolve_in(&self, identifier: &str, directory: &Path) -> Option<Arc<ModuleRecord>> {
        for candidate in Self::candidates(identifier, directory) {
            let path = match &candidate {
                Candidate::Script(p) | Candidate::Native(p) => p,
            };
            // Canonicalization failure means the candidate does not exist
            let canonical = match fs::canonicalize(path) {
                Ok(canonical) => canonical,
                Err(_) => continue,
            };

            // Dedup guarantee: aliased artifacts collapse to one record,
            // with no re-stat and no re-execution
            if let Some(record) = self.cache.get(&canonical) {
                tracing::trace!("cache hit for {}", canonical.display());
                return Some(record);
            }

            let metadata = match fs::metadata(&canonical) {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            if !metadata.is_file() {
                continue;
            }

            let record = match candidate {
                Candidate::Script(_) => {
                    ModuleRecord::new_script(identifier, canonical.clone(), metadata.len())
                }
                Candidate::Native(_) => {
                    // A library that fails to open lets the caller fall
                    // through to the next search directory
                    match unsafe { Library::new(&canonical) } {
                        Ok(library) => {
                            ModuleRecord::new_native(identifier, canonical.clone(), library)
                        }
                        Err(err) => {
                            tracing::debug!(
                                "{}: failed to open library: {err}",
                                canonical.display()
                            );
                            continue;
                        }
                    }
                }
            };

            let record = Arc::new(record);
            self.cache.insert(canonical, Arc::clone(&record));
            return Some(record);
        }
        None
    }

    /// Construct (or fetch) a record for an explicit artifact path, used
    /// for the main module. The kind is chosen by extension.
    pub fn resolve_exact(&self, path: &Path) -> Option<Arc<ModuleRecord>> {
        let canonical = fs::canonicalize(path).ok()?;
        if let Some(record) = self.cache.get(&canonical) {
            return Some(record);
        }
        let metadata = fs::metadata(&canonical).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let id = canonical
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| canonical.display().to_string());
        let is_native = canonical
            .extension()
            .is_some_and(|ext| ext == NATIVE_EXTENSION);
        let record = if is_native {
            let library = unsafe { Library::new(&canonical) }.ok()?;
            ModuleRecord::new_native(id, canonical.clone(), library)
        } else {
            ModuleRecord::new_script(id, canonical.clone(), metadata.len())
        };

        let record = Arc::new(record);
        self.cache.insert(canonical, Arc::clone(&record));
        Some(record)
    }

    /// Resolve a candidate's canonical path without constructing a record,
    /// opening a library, or touching the cache.
    pub fn probe(&self, identifier: &str, directory: &Path) -> Option<PathBuf> {
        for candidate in Self::candidates(identifier, directory) {
            let path = match &candidate {
                Candidate::Script(p) | Candidate::Native(p) => p,
            };
            if let Ok(canonical) = fs::canonicalize(path) {
                if canonical.is_file() {
                    return Some(canonical);
                }
            }
        }
        None
    }

    /// Drop a record from the cache so a corrected artifact can be
    /// resolved again.
    pub fn evict(&self, canonical_path: &Path) {
        if self.cache.delete(canonical_path).is_some() {
            tracing::debug!("evicted {}", canonical_path.display());
        }
    }

    fn candidates(identifier: &str, directory: &Path) -> [Candidate; 2] {
        [
            Candidate::Script(directory.join(format!("{identifier}.{SCRIPT_EXTENSION}"))),
            Candidate::Native(directory.join(format!("{identifier}.{NATIVE_EXTENSION}"))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_system::record::ModuleKind;
    use std::io::Write;

    #[test]
    fn test_missing_identifier_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ModuleFactory::new();
        assert!(factory.resolve_in("ghost", dir.path()).is_none());
        assert!(factory.cache().is_empty());
    }

    #[test]
    fn test_script_record_defers_reading() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("mod.js")).unwrap();
        file.write_all(b"export a 1\n").unwrap();

        let factory = ModuleFactory::new();
        let record = factory.resolve_in("mod", dir.path()).unwrap();
        match record.kind() {
            ModuleKind::Script { size } => assert_eq!(*size, 11),
            ModuleKind::Native { .. } => panic!("expected script record"),
        }
        assert_eq!(factory.cache().len(), 1);
    }

    #[test]
    fn test_repeat_resolution_reuses_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mod.js"), "").unwrap();

        let factory = ModuleFactory::new();
        let first = factory.resolve_in("mod", dir.path()).unwrap();
        let second = factory.resolve_in("mod", dir.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.cache().len(), 1);
    }

    #[test]
    fn test_directory_candidate_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("thing.js")).unwrap();

        let factory = ModuleFactory::new();
        assert!(factory.resolve_in("thing", dir.path()).is_none());
    }

    #[test]
    fn test_unopenable_library_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(format!("ext.{NATIVE_EXTENSION}")),
            b"not a shared object",
        )
        .unwrap();

        let factory = ModuleFactory::new();
        assert!(factory.resolve_in("ext", dir.path()).is_none());
        assert!(factory.cache().is_empty());
    }

    #[test]
    fn test_probe_does_not_populate_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mod.js"), "").unwrap();

        let factory = ModuleFactory::new();
        let path = factory.probe("mod", dir.path()).unwrap();
        assert!(path.is_absolute());
        assert!(factory.cache().is_empty());
    }
}
