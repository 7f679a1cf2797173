// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2026 Skiff Runtime Authors

//! A scripted engine for exercising the loader without an interpreter.
//!
//! "Source text" is a line-oriented directive list:
//!
//! ```text
//! # comment
//! export KEY VALUE        -- set KEY to the string VALUE
//! import KEY IDENTIFIER   -- require IDENTIFIER, store its namespace in KEY
//! require IDENTIFIER      -- require IDENTIFIER for its side effects
//! throw MESSAGE           -- raise MESSAGE from the module's top level
//! ```
//!
//! Anything else is a compile error, which lets tests exercise the
//! compile-failure path. Executed origins are recorded so tests can count
//! executions.

use skiff::{EngineError, ExecutionEngine, ModuleHost, Namespace, Value};
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct ScriptedEngine {
    pub executed: Vec<PathBuf>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionEngine for ScriptedEngine {
    fn execute(
        &mut self,
        source: &str,
        origin: &Path,
        namespace: &Namespace,
        host: &mut dyn ModuleHost,
    ) -> Result<(), EngineError> {
        self.executed.push(origin.to_path_buf());

        for (lineno, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (directive, rest) = match line.split_once(' ') {
                Some((directive, rest)) => (directive, rest.trim()),
                None => (line, ""),
            };
            match directive {
                "export" => {
                    let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
                    if key.is_empty() {
                        return Err(compile_error(origin, lineno, "export needs a key"));
                    }
                    namespace.set(key, Value::String(value.to_string()));
                }
                "import" => {
                    let Some((key, identifier)) = rest.split_once(' ') else {
                        return Err(compile_error(
                            origin,
                            lineno,
                            "import needs a key and an identifier",
                        ));
                    };
                    let imported = host.require(self, identifier.trim())?;
                    namespace.set(key, Value::Namespace(imported));
                }
                "require" => {
                    if rest.is_empty() {
                        return Err(compile_error(origin, lineno, "require needs an identifier"));
                    }
                    host.require(self, rest)?;
                }
                "throw" => {
                    return Err(EngineError::Thrown(rest.to_string()));
                }
                other => {
                    return Err(compile_error(
                        origin,
                        lineno,
                        &format!("unknown directive '{other}'"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call wins.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compile_error(origin: &Path, lineno: usize, message: &str) -> EngineError {
    EngineError::Compile {
        origin: origin.display().to_string(),
        message: format!("line {}: {message}", lineno + 1),
    }
}
