// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! # skiff
//!
//! Module resolution and loading for the Skiff script runtime.
//!
//! This crate locates, deduplicates, and loads modules on behalf of an
//! embedder-supplied execution engine:
//!
//! - An ordered, runtime-mutable search path for bare identifiers
//! - Relative requires resolved against the requiring module's directory
//! - Canonical-path deduplication: one record, one execution per on-disk
//!   artifact, however many identifiers alias it
//! - Native extensions loaded dynamically behind a versioned entry
//!   descriptor with strict ABI negotiation
//! - CommonJS-style circular requires (a module mid-load hands back its
//!   partial exports)
//! - A secure mode that searches only the installation directory,
//!   disables relative requires, and withholds process arguments from
//!   extensions
//!
//! The engine that compiles and runs source text belongs to the embedder
//! and is reached through the [`ExecutionEngine`] trait. The loader hands
//! each script to the engine with the module's [`Namespace`] and itself
//! (as [`ModuleHost`], the hosted `require`) pre-bound.
//!
//! ## Embedding
//!
//! ```rust,ignore
//! use skiff::{Loader, LoaderOptions};
//! use std::path::Path;
//!
//! let mut engine = MyEngine::new();
//! let mut loader = Loader::new(LoaderOptions::default());
//! loader.initialize()?;
//! match loader.load_main(&mut engine, Path::new("app.js")) {
//!     Ok(exports) => { /* ... */ }
//!     Err(err) => {
//!         eprintln!("skiff: {err}");
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! Load failures are ordinary errors, never process-fatal from inside the
//! loader; the embedding program decides how to report them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod module_system;

// Re-exports
pub use engine::{EngineError, ExecutionEngine, ModuleHost, Namespace, Value};
pub use error::{LoaderError, Result};
pub use module_system::{
    Loader, LoaderOptions, ModuleCache, ModuleKind, ModuleRecord, ModuleState, PathList,
};

/// Version of the skiff loader
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
