//! The program-builder seam.

use crate::diagnostics::{Diagnostic, sort_and_deduplicate};
use crate::options::CompilerOptions;
use crate::source::{SourceFile, SourceProvider};
use std::sync::Arc;

/// A type-checking engine able to build a [`Program`].
pub trait Engine {
    /// Engine-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build one program for `root_names`, reading every source file through `host`.
    fn create_program(
        &mut self,
        root_names: &[String],
        options: &CompilerOptions,
        host: &dyn SourceProvider,
    ) -> Result<Program, Self::Error>;
}

/// The result of one build: root files, options, and pre-emit diagnostics.
#[derive(Debug, Clone)]
pub struct Program {
    root_names: Vec<String>,
    options: CompilerOptions,
    source_files: Vec<Arc<SourceFile>>,
    diagnostics: Vec<Diagnostic>,
}

impl Program {
    /// Assemble a program. Diagnostics are sorted and de-duplicated here.
    pub fn new(
        root_names: Vec<String>,
        options: CompilerOptions,
        source_files: Vec<Arc<SourceFile>>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            root_names,
            options,
            source_files,
            diagnostics: sort_and_deduplicate(diagnostics),
        }
    }

    /// Root file names the program was built for.
    pub fn root_names(&self) -> &[String] {
        &self.root_names
    }

    /// Options the program was built with.
    pub fn compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Source files known to the program.
    pub fn source_files(&self) -> &[Arc<SourceFile>] {
        &self.source_files
    }

    /// Look up a source file by exact name.
    pub fn get_source_file(&self, file_name: &str) -> Option<&Arc<SourceFile>> {
        self.source_files
            .iter()
            .find(|file| file.file_name() == file_name)
    }

    /// Syntactic, semantic and option diagnostics, in engine order.
    pub fn pre_emit_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
