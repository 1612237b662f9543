#![warn(missing_docs)]
//! tsc-stdin core: check one unsaved file buffer against its project.
//!
//! # Overview
//!
//! The pipeline reads a file buffer, resolves the nearest `tsconfig.json`, substitutes the
//! buffer for the on-disk copy of the target file, asks a type-checking [`Engine`] to build a
//! single [`Program`], and reports the target file's diagnostics as
//! `path[line, column]: message` lines.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  check: run_check / report_diagnostics       │  ← Public API
//! ├──────────────────────────────────────────────┤
//! │  program: Engine trait, Program              │  ← Engine seam
//! ├──────────────────────────────────────────────┤
//! │  source: SourceProvider, BufferOverride      │  ← Buffer substitution
//! ├──────────────────────────────────────────────┤
//! │  config / options: tsconfig.json resolution  │  ← Project settings
//! ├──────────────────────────────────────────────┤
//! │  diagnostics / line_index / path             │  ← Data model
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tsc_stdin_core::{
//!     CompilerOptions, Diagnostic, Engine, Program, RequestContext, SourceProvider, run_check,
//! };
//!
//! /// Flags every buffer as a single error at its first character.
//! struct AlwaysOneError;
//!
//! impl Engine for AlwaysOneError {
//!     type Error = std::io::Error;
//!
//!     fn create_program(
//!         &mut self,
//!         root_names: &[String],
//!         options: &CompilerOptions,
//!         host: &dyn SourceProvider,
//!     ) -> Result<Program, Self::Error> {
//!         let file = host
//!             .get_source_file(&root_names[0], options.target(), &mut |_| {})
//!             .expect("buffer is always available");
//!         let diagnostic = Diagnostic::error(file.clone(), 0, 1, 1000, "Nope.");
//!         Ok(Program::new(root_names.to_vec(), options.clone(), vec![file], vec![diagnostic]))
//!     }
//! }
//!
//! let dir = std::env::temp_dir();
//! let context = Arc::new(RequestContext::new("scratch.ts", "let a = 1;"));
//! let reports = run_check(&mut AlwaysOneError, context, &dir).unwrap();
//! assert_eq!(reports[0].to_string(), "scratch.ts[1, 1]: Nope.");
//! ```

pub mod check;
pub mod config;
pub mod diagnostics;
pub mod input;
pub mod line_index;
pub mod options;
pub mod path;
pub mod program;
pub mod source;

pub use check::{
    CheckError, DiagnosticReport, check_reader, report_diagnostics, run_check, write_report,
};
pub use config::{
    CONFIG_FILE_NAME, ConfigError, ResolvedConfig, find_config_file, resolve_compiler_options,
};
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, DiagnosticMessageChain,
    compare_diagnostics, sort_and_deduplicate,
};
pub use input::{InputError, read_buffer};
pub use line_index::{LineAndCharacter, LineIndex};
pub use options::CompilerOptions;
pub use path::{normalize_path, to_absolute_path};
pub use program::{Engine, Program};
pub use source::{
    BufferOverride, DiskSourceProvider, RequestContext, ScriptTarget, SourceFile, SourceProvider,
};
