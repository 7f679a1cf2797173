// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! The seam between the loader and the script execution engine.
//!
//! Skiff does not ship an interpreter. The embedder supplies an
//! [`ExecutionEngine`] that can compile and run source text inside a
//! [`Namespace`]; the loader hands every script module to that engine and
//! exposes itself back to running code through [`ModuleHost`], the hosted
//! `require` entry point.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// A value stored in a module namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / not-yet-assigned value
    Undefined,
    /// Explicit null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
    /// A reference to another module's namespace
    Namespace(Namespace),
}

/// A module's isolated namespace: the exports object populated during load.
///
/// Namespaces are shared by reference: the owning [`ModuleRecord`] and every
/// holder of the module's exports see the same slots. Cloning shares the
/// underlying storage; equality is identity, not structure.
///
/// [`ModuleRecord`]: crate::module_system::ModuleRecord
#[derive(Clone, Default)]
pub struct Namespace {
    slots: Arc<RwLock<HashMap<String, Value>>>,
}

impl Namespace {
    /// Create a new empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.slots.read().get(key).cloned()
    }

    /// Set a value by key.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.slots.write().insert(key.into(), value);
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.slots.read().contains_key(key)
    }

    /// All keys currently present, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.slots.read().keys().cloned().collect()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether the namespace has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Whether two handles refer to the same underlying namespace.
    pub fn same_object(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl fmt::Debug for Namespace {
    // Keyed-only output: namespaces may reference each other cyclically.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("slots", &self.len())
            .finish()
    }
}

/// Errors raised by (or through) the execution engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the source text at compile time
    #[error("{origin}: compile error: {message}")]
    Compile {
        /// Diagnostic name of the artifact, normally its canonical path
        origin: String,
        /// Engine-provided detail
        message: String,
    },

    /// Running code raised an error that escaped the module's top level
    #[error("{0}")]
    Thrown(String),

    /// A host operation invoked from running code failed
    #[error("{0}")]
    Host(String),
}

/// The hosted entry point bound into every module.
///
/// Implemented by the loader. Engines call it when running code requires
/// another module, passing themselves back so nested loads can execute
/// through the same engine.
pub trait ModuleHost {
    /// Resolve and load `identifier`, returning the target module's exports.
    fn require(
        &mut self,
        engine: &mut dyn ExecutionEngine,
        identifier: &str,
    ) -> Result<Namespace, EngineError>;
}

/// An external script execution engine.
///
/// `execute` must compile `source` under `origin` as its diagnostic name and
/// run it to completion inside `namespace`, with `host` available as the
/// hosted require. Execution is synchronous; the call returns only once the
/// module's top level has finished or failed.
pub trait ExecutionEngine {
    /// Compile and run one module's source text.
    fn execute(
        &mut self,
        source: &str,
        origin: &Path,
        namespace: &Namespace,
        host: &mut dyn ModuleHost,
    ) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_sharing() {
        let ns = Namespace::new();
        let alias = ns.clone();
        ns.set("answer", Value::Number(42.0));
        assert_eq!(alias.get("answer"), Some(Value::Number(42.0)));
        assert!(ns.same_object(&alias));
        assert!(!ns.same_object(&Namespace::new()));
    }

    #[test]
    fn test_namespace_inspection() {
        let ns = Namespace::new();
        assert!(!ns.has("early"));
        assert!(ns.is_empty());

        ns.set("early", Value::String("yes".to_string()));
        ns.set("late", Value::Undefined);
        assert!(ns.has("early"));
        assert!(!ns.has("never"));
        assert_eq!(ns.len(), 2);

        let mut keys = ns.keys();
        keys.sort();
        assert_eq!(keys, ["early", "late"]);
    }

    #[test]
    fn test_namespace_identity_equality() {
        let a = Namespace::new();
        let b = Namespace::new();
        a.set("k", Value::Null);
        b.set("k", Value::Null);
        // Structurally identical but distinct objects
        assert_ne!(a, b);
    }
}
