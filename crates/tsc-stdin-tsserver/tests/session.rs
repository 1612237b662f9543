use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tsc_stdin_core::{
    BufferOverride, CompilerOptions, DiskSourceProvider, RequestContext, report_diagnostics,
};
use tsc_stdin_tsserver::{EngineError, ProjectSession, TsServerClient, frame_message};

/// Collects everything the client writes.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedSink {
    /// Wait until at least `count` request lines were written, then parse them.
    fn requests(&self, count: usize) -> Vec<Value> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let text = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            let lines: Vec<Value> = text
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect();
            if lines.len() >= count || Instant::now() >= deadline {
                return lines;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

fn response(request_seq: u64, command: &str, body: Value) -> Value {
    json!({
        "seq": 0,
        "type": "response",
        "command": command,
        "request_seq": request_seq,
        "success": true,
        "body": body,
    })
}

fn script(messages: &[Value]) -> Cursor<Vec<u8>> {
    Cursor::new(messages.iter().flat_map(frame_message).collect())
}

fn happy_path() -> Vec<Value> {
    vec![
        response(1, "configure", Value::Null),
        json!({ "seq": 0, "type": "event", "event": "projectLoadingStart", "body": {} }),
        response(2, "openExternalProject", json!(true)),
        response(3, "updateOpen", json!(true)),
        response(4, "syntacticDiagnosticsSync", json!([])),
        response(
            5,
            "semanticDiagnosticsSync",
            json!([{
                "start": 6,
                "length": 1,
                "message": "Type 'string' is not assignable to type 'number'.",
                "category": "error",
                "code": 2322,
                "startLocation": { "line": 1, "offset": 7 },
                "endLocation": { "line": 1, "offset": 8 },
            }]),
        ),
        response(
            6,
            "compilerOptionsDiagnostics-full",
            json!([{
                "message": "Option 'foo' is unknown.",
                "category": "error",
                "code": 5023,
            }]),
        ),
    ]
}

fn host(dir: &Path, target: &str, buffer: &str) -> BufferOverride<DiskSourceProvider> {
    BufferOverride::new(
        Arc::new(RequestContext::new(target, buffer)),
        DiskSourceProvider::new(dir),
    )
}

#[test]
fn test_build_reports_target_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let sink = SharedSink::default();
    let mut client = TsServerClient::from_streams(script(&happy_path()), sink.clone());
    let host = host(dir.path(), "test.ts", "const x: number = 'a';");

    let program = ProjectSession::new(&mut client, dir.path(), "/virtual/project")
        .build(&["test.ts".to_string()], &CompilerOptions::engine_defaults(), &host)
        .unwrap();

    let lines: Vec<String> = report_diagnostics(&program, "test.ts")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec!["test.ts[1, 7]: Type 'string' is not assignable to type 'number'."]
    );
    // The option diagnostic is kept but file-less.
    assert_eq!(program.pre_emit_diagnostics().len(), 2);
    assert_eq!(program.pre_emit_diagnostics()[0].file_name(), None);
}

#[test]
fn test_command_sequence_and_arguments() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("test.ts"), "on disk").unwrap();
    let sink = SharedSink::default();
    let mut client = TsServerClient::from_streams(script(&happy_path()), sink.clone());
    let host = host(dir.path(), "test.ts", "in buffer");
    let mut options = CompilerOptions::engine_defaults();
    options.force_no_emit();

    ProjectSession::new(&mut client, dir.path(), "/virtual/project")
        .build(&["test.ts".to_string()], &options, &host)
        .unwrap();

    let requests = sink.requests(7);
    let commands: Vec<&str> = requests
        .iter()
        .map(|r| r["command"].as_str().unwrap())
        .collect();
    assert_eq!(
        commands,
        vec![
            "configure",
            "openExternalProject",
            "updateOpen",
            "syntacticDiagnosticsSync",
            "semanticDiagnosticsSync",
            "compilerOptionsDiagnostics-full",
            "exit",
        ]
    );

    let seqs: Vec<u64> = requests.iter().map(|r| r["seq"].as_u64().unwrap()).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(requests.iter().all(|r| r["type"] == "request"));

    let absolute = format!("{}/test.ts", dir.path().display());
    let project = &requests[1]["arguments"];
    assert_eq!(project["projectFileName"], "/virtual/project");
    assert_eq!(project["rootFiles"], json!([{ "fileName": absolute }]));
    assert_eq!(project["options"]["noEmit"], json!(true));
    assert_eq!(project["options"]["target"], json!("es5"));
    assert_eq!(project["typeAcquisition"], json!({ "enable": false }));

    let open = &requests[2]["arguments"]["openFiles"][0];
    assert_eq!(open["file"], json!(absolute));
    assert_eq!(open["fileContent"], json!("in buffer"));

    let semantic = &requests[4]["arguments"];
    assert_eq!(semantic["includeLinePosition"], json!(true));
    assert_eq!(semantic["projectFileName"], "/virtual/project");
}

#[test]
fn test_failed_request_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut messages = happy_path();
    messages[5] = json!({
        "seq": 0,
        "type": "response",
        "command": "semanticDiagnosticsSync",
        "request_seq": 5,
        "success": false,
        "message": "No Project.",
    });
    let mut client = TsServerClient::from_streams(script(&messages), SharedSink::default());
    let host = host(dir.path(), "test.ts", "");

    let err = ProjectSession::new(&mut client, dir.path(), "/virtual/project")
        .build(&["test.ts".to_string()], &CompilerOptions::new(), &host)
        .unwrap_err();
    match err {
        EngineError::Request { command, message } => {
            assert_eq!(command, "semanticDiagnosticsSync");
            assert_eq!(message, "No Project.");
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[test]
fn test_server_exit_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let messages = happy_path()[..2].to_vec();
    let mut client = TsServerClient::from_streams(script(&messages), SharedSink::default());
    let host = host(dir.path(), "test.ts", "");

    let err = ProjectSession::new(&mut client, dir.path(), "/virtual/project")
        .build(&["test.ts".to_string()], &CompilerOptions::new(), &host)
        .unwrap_err();
    assert!(matches!(err, EngineError::Exited));
}

#[test]
fn test_garbage_output_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let reader = Cursor::new(b"Content-Length: 3\r\n\r\nnot json".to_vec());
    let mut client = TsServerClient::from_streams(reader, SharedSink::default());
    let host = host(dir.path(), "test.ts", "");

    let err = ProjectSession::new(&mut client, dir.path(), "/virtual/project")
        .build(&["test.ts".to_string()], &CompilerOptions::new(), &host)
        .unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[test]
fn test_unreadable_root_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let messages = vec![
        response(1, "configure", Value::Null),
        response(2, "openExternalProject", json!(true)),
        response(3, "updateOpen", json!(true)),
        response(4, "compilerOptionsDiagnostics-full", json!([])),
    ];
    let sink = SharedSink::default();
    let mut client = TsServerClient::from_streams(script(&messages), sink.clone());
    let host = host(dir.path(), "test.ts", "");

    let program = ProjectSession::new(&mut client, dir.path(), "/virtual/project")
        .build(&["missing.ts".to_string()], &CompilerOptions::new(), &host)
        .unwrap();
    assert!(program.pre_emit_diagnostics().is_empty());
    assert!(program.source_files().is_empty());
    assert_eq!(sink.requests(5)[1]["arguments"]["rootFiles"], json!([]));
}
