// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Loader orchestration: search, load stack, and the hosted require

use crate::engine::{EngineError, ExecutionEngine, ModuleHost, Namespace};
use crate::error::{LoaderError, Result};
use crate::module_system::cache::ModuleCache;
use crate::module_system::factory::ModuleFactory;
use crate::module_system::native::{self, ForwardedArgs};
use crate::module_system::path_list::PathList;
use crate::module_system::record::{ModuleKind, ModuleRecord, ModuleState};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loader configuration.
#[derive(Debug, Default)]
pub struct LoaderOptions {
    /// Secure mode: search only the installation directory, disable
    /// relative requires, and never forward arguments to extensions.
    pub secure: bool,
    /// Argument-forwarding mode: when set, native extension initializers
    /// receive this argument vector. Extensions otherwise get no argument
    /// access.
    pub arguments: Option<Vec<String>>,
}

/// The module loader: owns the search path, the cache (through the
/// factory), and the load stack; exposes the single hosted entry point.
///
/// Loaders are independent universes: two instances never share caches or
/// search paths.
pub struct Loader {
    options: LoaderOptions,
    paths: PathList,
    factory: ModuleFactory,
    builtins: HashMap<String, Namespace>,
    load_stack: Vec<Arc<ModuleRecord>>,
    main: Option<Arc<ModuleRecord>>,
    forwarded: Option<ForwardedArgs>,
    initialized: bool,
}

impl Loader {
    /// Create an uninitialized loader. Every resolution call is rejected
    /// until [`initialize`](Self::initialize) has run.
    pub fn new(options: LoaderOptions) -> Self {
        let forwarded = if options.secure {
            None
        } else {
            options.arguments.as_deref().map(ForwardedArgs::new)
        };
        Self {
            options,
            paths: PathList::new(),
            factory: ModuleFactory::new(),
            builtins: HashMap::new(),
            load_stack: Vec::new(),
            main: None,
            forwarded,
            initialized: false,
        }
    }

    /// Populate the search path and mark the loader ready. Idempotent: a
    /// second call succeeds without touching the already-built path list.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.paths = PathList::populate(self.options.secure);
        self.initialized = true;
        tracing::debug!(
            "loader initialized with {} search path entries (secure: {})",
            self.paths.len(),
            self.options.secure
        );
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The search path for non-relative identifiers.
    pub fn paths(&self) -> &PathList {
        &self.paths
    }

    /// Mutable access to the search path, as exposed to hosted code.
    pub fn paths_mut(&mut self) -> &mut PathList {
        &mut self.paths
    }

    /// The module cache.
    pub fn cache(&self) -> &ModuleCache {
        self.factory.cache()
    }

    /// Drop every cached record. The pinned main module record survives
    /// through its own handle and is never re-executed.
    pub fn clear_cache(&mut self) {
        self.factory.cache().clear();
    }

    /// The pinned main module, once one has loaded successfully.
    pub fn main_module(&self) -> Option<&Arc<ModuleRecord>> {
        self.main.as_ref()
    }

    /// The module whose load is currently on top of the stack. Relative
    /// identifiers resolve against its directory.
    pub fn current_module(&self) -> Option<&Arc<ModuleRecord>> {
        self.load_stack.last()
    }

    /// Register a builtin namespace. Bare identifiers consult the registry
    /// before any path search.
    pub fn register_builtin(&mut self, name: impl Into<String>, namespace: Namespace) {
        self.builtins.insert(name.into(), namespace);
    }

    /// Resolve and load `identifier`, returning the module's exports.
    ///
    /// Relative identifiers resolve against the current module's directory
    /// only; everything else is a first-match-wins scan over the search
    /// path. A module already loaded returns its cached exports without
    /// re-execution; a module still loading returns its partially
    /// populated exports (circular requires do not re-enter the load).
    pub fn require(
        &mut self,
        engine: &mut dyn ExecutionEngine,
        identifier: &str,
    ) -> Result<Namespace> {
        if !self.initialized {
            return Err(LoaderError::NotInitialized);
        }
        tracing::trace!("requiring '{identifier}'");

        if !is_relative(identifier) {
            if let Some(namespace) = self.builtins.get(identifier) {
                return Ok(namespace.clone());
            }
        }

        let record = self.resolve_record(identifier)?;
        self.load_record(engine, record)
    }

    /// Resolve `identifier` to its canonical path without loading it.
    /// Builtins resolve to their own name.
    pub fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        if !self.initialized {
            return Err(LoaderError::NotInitialized);
        }
        if !is_relative(identifier) && self.builtins.contains_key(identifier) {
            return Ok(PathBuf::from(identifier));
        }
        if is_relative(identifier) {
            if self.options.secure {
                return Err(LoaderError::module_not_found(identifier));
            }
            let current = self
                .current_module()
                .ok_or_else(|| LoaderError::module_not_found(identifier))?;
            return self
                .factory
                .probe(identifier, current.directory())
                .ok_or_else(|| LoaderError::module_not_found(identifier));
        }
        self.paths
            .enumerate()
            .find_map(|(_, dir)| self.factory.probe(identifier, dir))
            .ok_or_else(|| LoaderError::module_not_found(identifier))
    }

    /// Load the root module from an explicit artifact path. On success the
    /// record is pinned at the bottom of the load stack for the loader's
    /// lifetime, so top-level requires can use relative identifiers.
    pub fn load_main(
        &mut self,
        engine: &mut dyn ExecutionEngine,
        path: &Path,
    ) -> Result<Namespace> {
        if !self.initialized {
            return Err(LoaderError::NotInitialized);
        }
        let record = self
            .factory
            .resolve_exact(path)
            .ok_or_else(|| LoaderError::module_not_found(path.display().to_string()))?;
        let namespace = self.load_record(engine, Arc::clone(&record))?;
        if self.main.is_none() {
            self.main = Some(Arc::clone(&record));
            self.load_stack.push(record);
        }
        Ok(namespace)
    }

    fn resolve_record(&mut self, identifier: &str) -> Result<Arc<ModuleRecord>> {
        if is_relative(identifier) {
            // Relative identifiers never scan the search path, and are
            // unavailable in secure mode
            if self.options.secure {
                tracing::trace!("relative identifier '{identifier}' rejected in secure mode");
                return Err(LoaderError::module_not_found(identifier));
            }
            let directory = match self.current_module() {
                Some(current) => current.directory().to_path_buf(),
                None => return Err(LoaderError::module_not_found(identifier)),
            };
            return self
                .factory
                .resolve_in(identifier, &directory)
                .ok_or_else(|| LoaderError::module_not_found(identifier));
        }

        // First-match-wins scan. The error names only the identifier, not
        // the search list.
        let directories: Vec<PathBuf> = self
            .paths
            .enumerate()
            .map(|(_, dir)| dir.to_path_buf())
            .collect();
        for directory in &directories {
            if let Some(record) = self.factory.resolve_in(identifier, directory) {
                tracing::trace!(
                    "'{identifier}' resolved to {}",
                    record.canonical_path().display()
                );
                return Ok(record);
            }
        }
        Err(LoaderError::module_not_found(identifier))
    }

    fn load_record(
        &mut self,
        engine: &mut dyn ExecutionEngine,
        record: Arc<ModuleRecord>,
    ) -> Result<Namespace> {
        match record.state() {
            // Repeat require returns the cached exports without
            // re-execution
            ModuleState::Loaded => return Ok(record.namespace()),
            // Circular require: hand back the partially populated
            // namespace instead of re-entering the load
            ModuleState::Loading => {
                tracing::debug!(
                    "circular require of {}, returning partial exports",
                    record.canonical_path().display()
                );
                return Ok(record.namespace());
            }
            ModuleState::Unloaded | ModuleState::Failed => {}
        }

        record.set_state(ModuleState::Loading);
        self.load_stack.push(Arc::clone(&record));
        let result = match record.kind() {
            ModuleKind::Script { .. } => self.load_script(engine, &record),
            ModuleKind::Native { library } => {
                native::run_initializer(&record, library, self.forwarded.as_ref())
            }
        };
        // The pop is unconditional so sibling and parent resolutions see a
        // consistent stack
        self.load_stack.pop();

        match result {
            Ok(()) => {
                record.set_state(ModuleState::Loaded);
                Ok(record.namespace())
            }
            Err(err) => {
                record.fail(err.to_string());
                self.factory.evict(record.canonical_path());
                Err(err)
            }
        }
    }

    fn load_script(
        &mut self,
        engine: &mut dyn ExecutionEngine,
        record: &Arc<ModuleRecord>,
    ) -> Result<()> {
        let source = fs::read_to_string(record.canonical_path())?;
        let namespace = record.namespace();
        let origin = record.canonical_path().to_path_buf();
        engine.execute(&source, &origin, &namespace, self)?;
        Ok(())
    }
}

impl ModuleHost for Loader {
    fn require(
        &mut self,
        engine: &mut dyn ExecutionEngine,
        identifier: &str,
    ) -> std::result::Result<Namespace, EngineError> {
        Loader::require(self, engine, identifier).map_err(EngineError::from)
    }
}

fn is_relative(identifier: &str) -> bool {
    identifier == "."
        || identifier == ".."
        || identifier.starts_with("./")
        || identifier.starts_with("../")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relative() {
        assert!(is_relative("./a"));
        assert!(is_relative("../a/b"));
        assert!(is_relative("."));
        assert!(!is_relative("a"));
        assert!(!is_relative("a/b"));
        assert!(!is_relative(".hidden"));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut loader = Loader::new(LoaderOptions::default());
        assert!(!loader.is_initialized());
        loader.initialize().unwrap();
        let entries = loader.paths().len();
        loader.initialize().unwrap();
        assert_eq!(loader.paths().len(), entries);
    }

    #[test]
    fn test_resolve_before_initialize_is_rejected() {
        let loader = Loader::new(LoaderOptions::default());
        assert!(matches!(
            loader.resolve("anything"),
            Err(LoaderError::NotInitialized)
        ));
    }

    #[test]
    fn test_secure_mode_never_forwards_arguments() {
        let loader = Loader::new(LoaderOptions {
            secure: true,
            arguments: Some(vec!["prog".to_string(), "--flag".to_string()]),
        });
        assert!(loader.forwarded.is_none());
    }
}
