// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! Native extension ABI: entry descriptor, version negotiation, and
//! initializer invocation.
//!
//! An extension library exports one fixed-named static, the
//! [`ExtensionDescriptor`]. The descriptor's version fields are validated
//! before its function pointer is ever invoked.

use crate::engine::Namespace;
use crate::error::{LoaderError, Result};
use crate::module_system::record::ModuleRecord;
use libloading::Library;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Loader ABI major version. An extension's major version must match
/// exactly; a mismatch is a breaking-change boundary.
pub const ABI_MAJOR: u32 = 1;

/// Loader ABI minor version. An extension must declare this minor version
/// or a later one (additive-only compatibility).
pub const ABI_MINOR: u32 = 1;

/// The fixed symbol name every extension must export.
pub const ENTRY_SYMBOL: &str = "skiff_extension_entry";

/// Extension initializer. Receives the module's namespace to populate and,
/// in argument-forwarding mode, the process argument vector; otherwise
/// `(0, null)`. Returns `false` to report failure.
pub type ExtensionInit =
    unsafe extern "C" fn(namespace: *mut Namespace, argc: c_int, argv: *const *const c_char) -> bool;

/// The versioned entry descriptor exported by an extension under
/// [`ENTRY_SYMBOL`].
#[repr(C)]
pub struct ExtensionDescriptor {
    /// Declared ABI major version
    pub major_version: u32,
    /// Declared ABI minor version
    pub minor_version: u32,
    /// Initializer, invoked only after version negotiation succeeds
    pub init: ExtensionInit,
}

/// Process arguments marshalled for forwarding to extension initializers.
pub(crate) struct ForwardedArgs {
    storage: Vec<CString>,
}

impl ForwardedArgs {
    pub(crate) fn new(args: &[String]) -> Self {
        let storage = args
            .iter()
            .filter_map(|arg| CString::new(arg.as_str()).ok())
            .collect();
        Self { storage }
    }
}

/// Validate an extension's declared ABI version against the loader's.
pub(crate) fn negotiate(
    path: &std::path::Path,
    found_major: u32,
    found_minor: u32,
) -> Result<()> {
    if found_major != ABI_MAJOR || found_minor < ABI_MINOR {
        return Err(LoaderError::AbiMismatch {
            path: path.to_path_buf(),
            found_major,
            found_minor,
            want_major: ABI_MAJOR,
            want_minor: ABI_MINOR,
        });
    }
    Ok(())
}

/// Resolve the entry descriptor, negotiate its version, and run its
/// initializer against the record's namespace.
pub(crate) fn run_initializer(
    record: &ModuleRecord,
    library: &Library,
    args: Option<&ForwardedArgs>,
) -> Result<()> {
    let path = record.canonical_path();

    // The symbol is a static holding the descriptor, so its address is the
    // descriptor's address.
    let entry: libloading::Symbol<'_, *const ExtensionDescriptor> =
        unsafe { library.get(ENTRY_SYMBOL.as_bytes()) }.map_err(|err| {
            tracing::debug!("{}: no entry descriptor: {err}", path.display());
            LoaderError::MissingDescriptor {
                path: path.to_path_buf(),
                symbol: ENTRY_SYMBOL,
            }
        })?;
    let descriptor = unsafe { &**entry };

    if let Err(err) = negotiate(path, descriptor.major_version, descriptor.minor_version) {
        tracing::warn!("{err}");
        return Err(err);
    }

    let mut namespace = record.namespace();
    let pointers: Vec<*const c_char> = args
        .map(|fwd| fwd.storage.iter().map(|arg| arg.as_ptr()).collect())
        .unwrap_or_default();
    let (argc, argv) = if pointers.is_empty() {
        (0, ptr::null())
    } else {
        (pointers.len() as c_int, pointers.as_ptr())
    };

    let ok = unsafe { (descriptor.init)(&mut namespace as *mut Namespace, argc, argv) };
    if !ok {
        return Err(LoaderError::ExtensionInit {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
