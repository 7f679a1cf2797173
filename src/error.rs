// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Error types for the module loader

use crate::engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while resolving and loading modules
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Resolution was attempted before the loader was initialized
    #[error("module loader is not initialized")]
    NotInitialized,

    /// No search directory yielded an artifact for the identifier
    #[error("cannot find module '{0}'")]
    ModuleNotFound(String),

    /// A native extension opened but does not export the entry descriptor
    #[error("{}: missing extension entry symbol '{symbol}'", .path.display())]
    MissingDescriptor {
        /// Canonical path of the library
        path: PathBuf,
        /// The fixed symbol name that was looked up
        symbol: &'static str,
    },

    /// A native extension's descriptor failed ABI version negotiation
    #[error(
        "{}: incompatible extension ABI {found_major}.{found_minor} \
         (loader requires {want_major}.{want_minor} or a later minor)",
        .path.display()
    )]
    AbiMismatch {
        /// Canonical path of the library
        path: PathBuf,
        /// Major version declared by the extension
        found_major: u32,
        /// Minor version declared by the extension
        found_minor: u32,
        /// Loader's major version (must match exactly)
        want_major: u32,
        /// Loader's minor version (extension must meet or exceed)
        want_minor: u32,
    },

    /// A native extension's initializer reported failure
    #[error("{}: extension initializer failed", .path.display())]
    ExtensionInit {
        /// Canonical path of the library
        path: PathBuf,
    },

    /// Compile or execution failure surfaced by the engine
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// File system error
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// Create a module-not-found error
    pub fn module_not_found(identifier: impl Into<String>) -> Self {
        Self::ModuleNotFound(identifier.into())
    }
}

impl From<LoaderError> for EngineError {
    fn from(err: LoaderError) -> Self {
        match err {
            // Engine errors pass back through engine frames unchanged
            LoaderError::Engine(inner) => inner,
            other => EngineError::Host(other.to_string()),
        }
    }
}
