// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Module resolution and loading
//!
//! Given a symbolic identifier and the caller's location, locates a backing
//! artifact (script source or native extension), loads it at most once per
//! canonical path, executes it in an isolated namespace, and returns its
//! exports.
//!
//! ## Resolution
//! - Relative identifiers (`./x`, `../x`) resolve against the directory of
//!   the module currently loading; one attempt, no path scan.
//! - Bare identifiers scan the [`PathList`] in order, first match wins.
//!
//! ## Artifacts
//! - `<dir>/<identifier>.js`: source text, handed to the embedder's
//!   execution engine.
//! - `<dir>/<identifier>.<dll>`: a native extension exporting a versioned
//!   entry descriptor.

mod cache;
mod factory;
mod loader;
pub mod native;
mod path_list;
mod record;

pub use cache::ModuleCache;
pub use factory::{ModuleFactory, NATIVE_EXTENSION, SCRIPT_EXTENSION};
pub use loader::{Loader, LoaderOptions};
pub use native::{ABI_MAJOR, ABI_MINOR, ENTRY_SYMBOL, ExtensionDescriptor, ExtensionInit};
pub use path_list::{INSTALL_DIR, PathList, SEARCH_PATH_ENV};
pub use record::{ModuleKind, ModuleRecord, ModuleState};
