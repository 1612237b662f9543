//! Typed tsserver protocol messages.
//!
//! Only the handful of commands the checker needs are modelled. Bodies the client does not
//! interpret stay as raw [`Value`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tsc_stdin_core::DiagnosticCategory;

/// Command names used by the checker.
pub mod command {
    /// Host configuration.
    pub const CONFIGURE: &str = "configure";
    /// Create (or replace) an external project with explicit root files and options.
    pub const OPEN_EXTERNAL_PROJECT: &str = "openExternalProject";
    /// Open files with client-supplied content.
    pub const UPDATE_OPEN: &str = "updateOpen";
    /// Syntactic diagnostics of one file.
    pub const SYNTACTIC_DIAGNOSTICS_SYNC: &str = "syntacticDiagnosticsSync";
    /// Semantic diagnostics of one file.
    pub const SEMANTIC_DIAGNOSTICS_SYNC: &str = "semanticDiagnosticsSync";
    /// Project-wide option diagnostics.
    pub const COMPILER_OPTIONS_DIAGNOSTICS: &str = "compilerOptionsDiagnostics-full";
    /// Shut the server down.
    pub const EXIT: &str = "exit";
}

/// A client request as written on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    /// Client-allocated sequence number.
    pub seq: u64,
    /// Always `"request"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Command name.
    pub command: &'a str,
    /// Command arguments.
    pub arguments: Value,
}

impl<'a> Request<'a> {
    /// Create a request.
    pub fn new(seq: u64, command: &'a str, arguments: Value) -> Self {
        Self {
            seq,
            kind: "request",
            command,
            arguments,
        }
    }

    /// The request as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A message emitted by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// The answer to a client request.
    Response(Response),
    /// An unsolicited notification.
    Event(Event),
    /// Anything else.
    #[serde(other)]
    Unknown,
}

/// A server response.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// The `seq` of the request being answered.
    pub request_seq: u64,
    /// Whether the command succeeded.
    pub success: bool,
    /// Command name echoed back.
    #[serde(default)]
    pub command: String,
    /// Error text when `success` is `false`.
    #[serde(default)]
    pub message: Option<String>,
    /// Command result.
    #[serde(default)]
    pub body: Option<Value>,
}

/// A server event.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name (`projectLoadingStart`, `telemetry`, ...).
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub body: Option<Value>,
}

/// A one-based line/offset location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Location {
    /// 1-based line.
    pub line: usize,
    /// 1-based character offset.
    pub offset: usize,
}

/// A diagnostic as returned with `includeLinePosition: true`.
///
/// The message is already flattened by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticWithLinePosition {
    /// Start offset in UTF-16 code units.
    #[serde(default)]
    pub start: Option<usize>,
    /// Length in UTF-16 code units.
    #[serde(default)]
    pub length: Option<usize>,
    /// Flattened message text.
    pub message: String,
    /// Category name (`"error"`, `"warning"`, ...).
    pub category: String,
    /// Diagnostic code.
    pub code: u32,
    /// Start location.
    #[serde(default)]
    pub start_location: Option<Location>,
    /// End location.
    #[serde(default)]
    pub end_location: Option<Location>,
}

impl DiagnosticWithLinePosition {
    /// Parse a diagnostics response body (a JSON array).
    pub fn parse_list(body: Option<Value>) -> Result<Vec<Self>, serde_json::Error> {
        match body {
            Some(value) => serde_json::from_value(value),
            None => Ok(Vec::new()),
        }
    }

    /// The category, treating unknown names as errors.
    pub fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::from_name(&self.category).unwrap_or(DiagnosticCategory::Error)
    }

    /// The message with platform line endings normalized to `\n`.
    pub fn message_text(&self) -> String {
        self.message.replace("\r\n", "\n")
    }
}
