// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! In-memory representation of one loaded (or loading) module

use crate::engine::Namespace;
use libloading::Library;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Load state of a module record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Created, not yet loaded
    Unloaded,
    /// Load in progress (present on the load stack)
    Loading,
    /// Load completed; exports are final and the state is permanent
    Loaded,
    /// Load failed; the record has been evicted from the cache
    Failed,
}

/// The kind of artifact backing a module.
#[derive(Debug)]
pub enum ModuleKind {
    /// Interpreted source text
    Script {
        /// File size recorded at construction; the contents are read at
        /// load time
        size: u64,
    },
    /// Dynamically loaded native extension. The library handle lives as
    /// long as the record; code pointers handed out through the exports
    /// must never dangle, so the library is only released on destruction.
    Native {
        /// The opened library
        library: Library,
    },
}

/// One module: identifier, canonical path, namespace, and load state.
///
/// Records are created by the factory the first time a canonical path is
/// resolved and shared between the cache and the load stack. Two records
/// never share a canonical path.
#[derive(Debug)]
pub struct ModuleRecord {
    id: String,
    canonical_path: PathBuf,
    kind: ModuleKind,
    namespace: Namespace,
    state: RwLock<ModuleState>,
    last_error: RwLock<Option<String>>,
}

impl ModuleRecord {
    /// Create a record for a script artifact.
    pub(crate) fn new_script(id: impl Into<String>, canonical_path: PathBuf, size: u64) -> Self {
        Self::new(id, canonical_path, ModuleKind::Script { size })
    }

    /// Create a record for an opened native extension.
    pub(crate) fn new_native(
        id: impl Into<String>,
        canonical_path: PathBuf,
        library: Library,
    ) -> Self {
        Self::new(id, canonical_path, ModuleKind::Native { library })
    }

    fn new(id: impl Into<String>, canonical_path: PathBuf, kind: ModuleKind) -> Self {
        Self {
            id: id.into(),
            canonical_path,
            kind,
            namespace: Namespace::new(),
            state: RwLock::new(ModuleState::Unloaded),
            last_error: RwLock::new(None),
        }
    }

    /// The identifier used at first resolution.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The absolute, symlink-resolved path of the backing artifact.
    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }

    /// The directory containing the artifact, used to resolve relative
    /// identifiers issued by this module.
    pub fn directory(&self) -> &Path {
        self.canonical_path.parent().unwrap_or(Path::new("/"))
    }

    /// The kind of backing artifact.
    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// A shared handle to the module's namespace.
    pub fn namespace(&self) -> Namespace {
        self.namespace.clone()
    }

    /// Current load state.
    pub fn state(&self) -> ModuleState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, state: ModuleState) {
        *self.state.write() = state;
    }

    /// Mark the record failed and capture the failure detail.
    pub(crate) fn fail(&self, message: String) {
        *self.state.write() = ModuleState::Failed;
        *self.last_error.write() = Some(message);
    }

    /// The captured failure detail, present only when the state is
    /// [`ModuleState::Failed`].
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }
}
