//! [`Engine`] implementation backed by a tsserver process.
//!
//! One program build is one short-lived server session:
//!
//! 1. `configure`
//! 2. `openExternalProject` with the roots and the resolved options
//! 3. `updateOpen` with each root's text, taken from the host
//! 4. `syntacticDiagnosticsSync` + `semanticDiagnosticsSync` per root
//! 5. `compilerOptionsDiagnostics-full` for the project
//! 6. `exit`

use crate::client::TsServerClient;
use crate::error::EngineError;
use crate::locate::EngineSettings;
use crate::protocol::{DiagnosticWithLinePosition, command};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tsc_stdin_core::path::directory_of;
use tsc_stdin_core::{
    CompilerOptions, Diagnostic, DiagnosticMessage, Engine, Program, SourceFile, SourceProvider,
    to_absolute_path,
};

/// Host name reported through `configure`.
const HOST_INFO: &str = "tsc-stdin";

/// Type-checks by driving `node tsserver.js` over stdio.
#[derive(Debug, Clone)]
pub struct TsServerEngine {
    settings: EngineSettings,
    base_dir: PathBuf,
}

impl TsServerEngine {
    /// Create an engine. Relative root names resolve against `base_dir`.
    pub fn new(settings: EngineSettings, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            base_dir: base_dir.into(),
        }
    }

    /// Launch settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl Engine for TsServerEngine {
    type Error = EngineError;

    fn create_program(
        &mut self,
        root_names: &[String],
        options: &CompilerOptions,
        host: &dyn SourceProvider,
    ) -> Result<Program, Self::Error> {
        let first_root_dir = root_names
            .first()
            .map(|root| PathBuf::from(directory_of(&to_absolute_path(&self.base_dir, root))))
            .unwrap_or_else(|| self.base_dir.clone());
        let tsserver = self
            .settings
            .locate_tsserver(&[&first_root_dir, &self.base_dir])?;

        info!(tsserver = %tsserver.display(), "starting tsserver");
        let mut client = TsServerClient::spawn(self.settings.command(&tsserver))?;

        let project_file_name = to_absolute_path(
            &self.base_dir,
            &format!("tsc-stdin-{}.project", std::process::id()),
        );
        ProjectSession::new(&mut client, &self.base_dir, project_file_name).build(
            root_names,
            options,
            host,
        )
    }
}

/// One root file: the name the caller used, its absolute form, and the host's copy.
struct Root {
    name: String,
    absolute: String,
    file: Arc<SourceFile>,
}

/// Drives the command sequence of one build against a connected client.
pub struct ProjectSession<'a> {
    client: &'a mut TsServerClient,
    base_dir: String,
    project_file_name: String,
}

impl<'a> ProjectSession<'a> {
    /// Create a session using `project_file_name` as the external project's name.
    pub fn new(
        client: &'a mut TsServerClient,
        base_dir: &Path,
        project_file_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_dir: to_absolute_path(base_dir, "."),
            project_file_name: project_file_name.into(),
        }
    }

    /// Build the program for `root_names`, then shut the server down.
    pub fn build(
        mut self,
        root_names: &[String],
        options: &CompilerOptions,
        host: &dyn SourceProvider,
    ) -> Result<Program, EngineError> {
        let roots = self.load_roots(root_names, options, host);

        self.client
            .call(command::CONFIGURE, json!({ "hostInfo": HOST_INFO }))?;
        self.open_project(&roots, options)?;
        self.open_files(&roots)?;

        let mut diagnostics = Vec::new();
        for root in &roots {
            for cmd in [
                command::SYNTACTIC_DIAGNOSTICS_SYNC,
                command::SEMANTIC_DIAGNOSTICS_SYNC,
            ] {
                let body = self.client.call(
                    cmd,
                    json!({
                        "file": root.absolute,
                        "projectFileName": self.project_file_name,
                        "includeLinePosition": true,
                    }),
                )?;
                let found = parse_diagnostics(cmd, body)?;
                debug!(file = %root.name, command = cmd, count = found.len(), "diagnostics");
                diagnostics.extend(
                    found
                        .into_iter()
                        .map(|d| convert_diagnostic(d, Some(root.file.clone()))),
                );
            }
        }

        let body = self.client.call(
            command::COMPILER_OPTIONS_DIAGNOSTICS,
            json!({ "projectFileName": self.project_file_name }),
        )?;
        for d in parse_diagnostics(command::COMPILER_OPTIONS_DIAGNOSTICS, body)? {
            debug!(code = d.code, message = %d.message, "project diagnostic");
            diagnostics.push(convert_diagnostic(d, None));
        }

        self.client.notify(command::EXIT, Value::Null)?;

        let source_files = roots.iter().map(|root| root.file.clone()).collect();
        Ok(Program::new(
            root_names.to_vec(),
            options.clone(),
            source_files,
            diagnostics,
        ))
    }

    fn load_roots(
        &self,
        root_names: &[String],
        options: &CompilerOptions,
        host: &dyn SourceProvider,
    ) -> Vec<Root> {
        let mut roots = Vec::with_capacity(root_names.len());
        for name in root_names {
            let mut on_error = |message: &str| warn!(file = %name, "{message}");
            let Some(file) = host.get_source_file(name, options.target(), &mut on_error) else {
                continue;
            };
            roots.push(Root {
                name: name.clone(),
                absolute: to_absolute_path(Path::new(&self.base_dir), name),
                file,
            });
        }
        roots
    }

    fn open_project(&mut self, roots: &[Root], options: &CompilerOptions) -> Result<(), EngineError> {
        let root_files: Vec<Value> = roots
            .iter()
            .map(|root| json!({ "fileName": root.absolute }))
            .collect();
        self.client.call(
            command::OPEN_EXTERNAL_PROJECT,
            json!({
                "projectFileName": self.project_file_name,
                "rootFiles": root_files,
                "options": options,
                "typeAcquisition": { "enable": false },
            }),
        )?;
        Ok(())
    }

    fn open_files(&mut self, roots: &[Root]) -> Result<(), EngineError> {
        let open_files: Vec<Value> = roots
            .iter()
            .map(|root| {
                json!({
                    "file": root.absolute,
                    "fileContent": root.file.text(),
                    "projectRootPath": self.base_dir,
                })
            })
            .collect();
        self.client
            .call(command::UPDATE_OPEN, json!({ "openFiles": open_files }))?;
        Ok(())
    }
}

fn parse_diagnostics(
    cmd: &str,
    body: Option<Value>,
) -> Result<Vec<DiagnosticWithLinePosition>, EngineError> {
    DiagnosticWithLinePosition::parse_list(body)
        .map_err(|err| EngineError::Protocol(format!("{cmd}: {err}")))
}

fn convert_diagnostic(
    diagnostic: DiagnosticWithLinePosition,
    file: Option<Arc<SourceFile>>,
) -> Diagnostic {
    Diagnostic {
        start: diagnostic.start.filter(|_| file.is_some()),
        length: diagnostic.length.filter(|_| file.is_some()),
        category: diagnostic.category(),
        code: diagnostic.code,
        message: DiagnosticMessage::Text(diagnostic.message_text()),
        file,
    }
}
