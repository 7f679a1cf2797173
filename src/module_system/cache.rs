// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Module cache keyed by canonical path

use crate::module_system::record::ModuleRecord;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Mapping from canonical absolute path to module record.
///
/// Guarantees at most one record per distinct on-disk artifact: every
/// identifier or search-path entry that canonicalizes to the same path
/// observes the same record and the same exports.
pub struct ModuleCache {
    records: DashMap<PathBuf, Arc<ModuleRecord>>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Get a cached record by canonical path
    pub fn get(&self, path: &Path) -> Option<Arc<ModuleRecord>> {
        self.records.get(path).map(|entry| Arc::clone(&entry))
    }

    /// Check if a record is cached
    pub fn has(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    /// Add a record to the cache
    pub fn insert(&self, path: PathBuf, record: Arc<ModuleRecord>) {
        self.records.insert(path, record);
    }

    /// Remove a record from the cache
    pub fn delete(&self, path: &Path) -> Option<Arc<ModuleRecord>> {
        self.records.remove(path).map(|(_, record)| record)
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Get all cached canonical paths
    pub fn keys(&self) -> Vec<PathBuf> {
        self.records.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Get the number of cached records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}
