//! The single-file check pipeline and its output format.

use crate::config::{ConfigError, resolve_compiler_options};
use crate::input::{InputError, read_buffer};
use crate::program::{Engine, Program};
use crate::source::{BufferOverride, DiskSourceProvider, RequestContext};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The buffer could not be read.
    #[error("failed to read the file buffer")]
    Input(#[from] InputError),
    /// The project configuration could not be loaded.
    #[error("failed to load project configuration")]
    Config(#[from] ConfigError),
    /// The engine failed to build the program.
    #[error("type-checking engine failed")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// One output line: a diagnostic of the target file at a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// The target path as given (normalized).
    pub file_name: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based character, in UTF-16 code units.
    pub character: usize,
    /// First line of the flattened message.
    pub message: String,
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}, {}]: {}",
            self.file_name, self.line, self.character, self.message
        )
    }
}

/// Keep the diagnostics attributed to `target` and convert them to reports, in program order.
pub fn report_diagnostics(program: &Program, target: &str) -> Vec<DiagnosticReport> {
    program
        .pre_emit_diagnostics()
        .iter()
        .filter_map(|diagnostic| {
            let file = diagnostic.file.as_ref()?;
            if file.file_name() != target {
                return None;
            }
            let position = file.line_and_character_of_position(diagnostic.start.unwrap_or(0));
            Some(DiagnosticReport {
                file_name: file.file_name().to_string(),
                line: position.line + 1,
                character: position.character + 1,
                message: diagnostic.message.first_line(),
            })
        })
        .collect()
}

/// Check the buffer of `context` with `engine`.
///
/// Relative paths (the target, config lookups, dependency files) resolve against `base_dir`.
pub fn run_check<E: Engine>(
    engine: &mut E,
    context: Arc<RequestContext>,
    base_dir: &Path,
) -> Result<Vec<DiagnosticReport>, CheckError> {
    let target = context.target_path().to_string();
    let resolved = resolve_compiler_options(&target, base_dir)?;
    debug!(options = ?resolved.options, "resolved compiler options");

    let host = BufferOverride::new(context, DiskSourceProvider::new(base_dir));
    let root_names = vec![target.clone()];

    info!(target = %target, "building program");
    let program = engine
        .create_program(&root_names, &resolved.options, &host)
        .map_err(|err| CheckError::Engine(Box::new(err)))?;

    let reports = report_diagnostics(&program, &target);
    info!(
        total = program.pre_emit_diagnostics().len(),
        reported = reports.len(),
        "check finished"
    );
    Ok(reports)
}

/// Read the buffer from `reader`, then check it as `target`.
pub fn check_reader<E: Engine, R: Read>(
    engine: &mut E,
    target: &str,
    reader: R,
    base_dir: &Path,
) -> Result<Vec<DiagnosticReport>, CheckError> {
    let buffer = read_buffer(reader)?;
    debug!(bytes = buffer.len(), "read buffer");
    let context = Arc::new(RequestContext::new(target, buffer));
    run_check(engine, context, base_dir)
}

/// Write one line per report.
pub fn write_report<W: Write>(mut out: W, reports: &[DiagnosticReport]) -> io::Result<()> {
    for report in reports {
        writeln!(out, "{report}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessageChain};
    use crate::options::CompilerOptions;
    use crate::source::{ScriptTarget, SourceFile};

    fn program_with(diagnostics: Vec<Diagnostic>, files: Vec<Arc<SourceFile>>) -> Program {
        Program::new(
            vec!["test.ts".to_string()],
            CompilerOptions::new(),
            files,
            diagnostics,
        )
    }

    #[test]
    fn test_report_format() {
        let report = DiagnosticReport {
            file_name: "test.ts".to_string(),
            line: 1,
            character: 7,
            message: "Type 'string' is not assignable to type 'number'.".to_string(),
        };
        assert_eq!(
            report.to_string(),
            "test.ts[1, 7]: Type 'string' is not assignable to type 'number'."
        );
    }

    #[test]
    fn test_report_filters_other_files() {
        let target = Arc::new(SourceFile::new("test.ts", "a\nbb", ScriptTarget::Es5));
        let other = Arc::new(SourceFile::new("dep.ts", "", ScriptTarget::Es5));
        let program = program_with(
            vec![
                Diagnostic::error(other.clone(), 0, 1, 2304, "elsewhere"),
                Diagnostic::error(target.clone(), 3, 1, 2304, "here"),
                Diagnostic::global(5023, DiagnosticCategory::Error, "unknown option"),
            ],
            vec![target, other],
        );

        let reports = report_diagnostics(&program, "test.ts");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].to_string(), "test.ts[2, 2]: here");
    }

    #[test]
    fn test_report_missing_start_is_first_position() {
        let target = Arc::new(SourceFile::new("test.ts", "x", ScriptTarget::Es5));
        let mut diagnostic = Diagnostic::error(target.clone(), 0, 0, 1, "no start");
        diagnostic.start = None;
        let program = program_with(vec![diagnostic], vec![target]);

        let reports = report_diagnostics(&program, "test.ts");
        assert_eq!(reports[0].line, 1);
        assert_eq!(reports[0].character, 1);
    }

    #[test]
    fn test_report_keeps_first_chain_line() {
        let target = Arc::new(SourceFile::new("test.ts", "x", ScriptTarget::Es5));
        let chain = DiagnosticMessageChain::new("outer")
            .with_next(DiagnosticMessageChain::new("inner"));
        let program = program_with(
            vec![Diagnostic::error(target.clone(), 0, 1, 2322, chain)],
            vec![target],
        );

        assert_eq!(report_diagnostics(&program, "test.ts")[0].message, "outer");
    }

    #[test]
    fn test_write_report_lines() {
        let reports = vec![
            DiagnosticReport {
                file_name: "a.ts".to_string(),
                line: 1,
                character: 1,
                message: "one".to_string(),
            },
            DiagnosticReport {
                file_name: "a.ts".to_string(),
                line: 3,
                character: 4,
                message: "two".to_string(),
            },
        ];
        let mut out = Vec::new();
        write_report(&mut out, &reports).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a.ts[1, 1]: one\na.ts[3, 4]: two\n"
        );
    }
}
