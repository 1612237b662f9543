//! Minimal tsserver client over stdio.
//!
//! Two background threads own the pipes: a writer draining an outbound channel and a reader
//! pushing decoded frames into an inbound channel. The caller blocks on the inbound channel
//! until the response with the matching `request_seq` arrives. No async runtime is involved.

use crate::error::EngineError;
use crate::protocol::{Request, ServerMessage};
use crate::transport::{read_message, write_request};
use serde_json::Value;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process::{Child, Command as ProcessCommand, Stdio};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, trace};

#[derive(Debug)]
/// Outbound messages sent to the server.
pub enum Outbound {
    /// A request value, already shaped.
    Message(Value),
}

#[derive(Debug)]
/// Inbound messages received from the server.
pub enum Inbound {
    /// A decoded frame.
    Message(Value),
    /// An I/O error produced by the background reader/writer threads.
    IoError(String),
    /// The server closed its stdout.
    Closed,
}

/// A blocking request/response client for one tsserver process.
pub struct TsServerClient {
    child: Option<Child>,
    tx: mpsc::Sender<Outbound>,
    rx: mpsc::Receiver<Inbound>,
    next_seq: u64,
}

impl TsServerClient {
    /// Spawn the server and connect via its stdio.
    ///
    /// This overrides `stdin` / `stdout` to be piped and discards `stderr`.
    pub fn spawn(mut cmd: ProcessCommand) -> Result<Self, EngineError> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        let program = cmd.get_program().to_string_lossy().into_owned();
        let child = cmd.spawn().map_err(|source| EngineError::Spawn {
            command: program,
            source,
        })?;
        Self::from_child(child)
    }

    /// Create a client from an already-spawned process child.
    pub fn from_child(mut child: Child) -> Result<Self, EngineError> {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("Failed to open tsserver stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("Failed to open tsserver stdout"))?;

        let mut client = Self::from_streams(stdout, stdin);
        client.child = Some(child);
        Ok(client)
    }

    /// Connect to a server reachable through arbitrary byte streams.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx_out, rx_out) = mpsc::channel::<Outbound>();
        let (tx_in, rx_in) = mpsc::channel::<Inbound>();

        {
            let tx_in = tx_in.clone();
            thread::spawn(move || write_loop(writer, rx_out, tx_in));
        }
        thread::spawn(move || read_loop(reader, tx_in));

        Self {
            child: None,
            tx: tx_out,
            rx: rx_in,
            next_seq: 1,
        }
    }

    /// Send a request and return the allocated sequence number.
    pub fn request(&mut self, command: &str, arguments: Value) -> Result<u64, EngineError> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);

        debug!(seq, command, "tsserver request");
        self.send_message(Request::new(seq, command, arguments).to_value())?;
        Ok(seq)
    }

    /// Send a request whose answer is not awaited (`exit`).
    pub fn notify(&mut self, command: &str, arguments: Value) -> Result<(), EngineError> {
        self.request(command, arguments).map(|_| ())
    }

    /// Send a request and wait for its response body.
    pub fn call(&mut self, command: &str, arguments: Value) -> Result<Option<Value>, EngineError> {
        let seq = self.request(command, arguments)?;
        self.wait_for_response(seq, command)
    }

    fn send_message(&self, message: Value) -> Result<(), EngineError> {
        self.tx.send(Outbound::Message(message)).map_err(|_| {
            EngineError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "tsserver writer thread stopped",
            ))
        })
    }

    /// Block until the response to `seq` arrives.
    ///
    /// Events and unrelated responses received meanwhile are logged and dropped.
    pub fn wait_for_response(
        &mut self,
        seq: u64,
        command: &str,
    ) -> Result<Option<Value>, EngineError> {
        loop {
            let inbound = self.rx.recv().map_err(|_| EngineError::Exited)?;

            let value = match inbound {
                Inbound::IoError(err) => {
                    return Err(EngineError::Io(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        err,
                    )));
                }
                Inbound::Closed => return Err(EngineError::Exited),
                Inbound::Message(value) => value,
            };

            let message: ServerMessage = serde_json::from_value(value)
                .map_err(|err| EngineError::Protocol(err.to_string()))?;

            match message {
                ServerMessage::Response(response) if response.request_seq == seq => {
                    if !response.success {
                        return Err(EngineError::Request {
                            command: command.to_string(),
                            message: response.message.unwrap_or_default(),
                        });
                    }
                    trace!(seq, command, "tsserver response");
                    return Ok(response.body);
                }
                ServerMessage::Response(response) => {
                    debug!(
                        request_seq = response.request_seq,
                        command = %response.command,
                        "ignoring unrelated tsserver response"
                    );
                }
                ServerMessage::Event(event) => {
                    debug!(event = %event.event, "tsserver event");
                }
                ServerMessage::Unknown => {
                    debug!("ignoring unknown tsserver message");
                }
            }
        }
    }
}

impl Drop for TsServerClient {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Ok(None) = child.try_wait() {
                debug!(pid = child.id(), "killing tsserver");
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

fn write_loop<W: Write>(writer: W, rx: mpsc::Receiver<Outbound>, tx_in: mpsc::Sender<Inbound>) {
    let mut writer = BufWriter::new(writer);
    for msg in rx {
        match msg {
            Outbound::Message(value) => {
                if let Err(err) = write_request(&mut writer, &value) {
                    let _ = tx_in.send(Inbound::IoError(err.to_string()));
                    break;
                }
            }
        }
    }
}

fn read_loop<R: Read>(reader: R, tx: mpsc::Sender<Inbound>) {
    let mut reader = BufReader::new(reader);
    loop {
        match read_message(&mut reader) {
            Ok(Some(value)) => {
                if tx.send(Inbound::Message(value)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                let _ = tx.send(Inbound::Closed);
                break;
            }
            Err(err) => {
                let _ = tx.send(Inbound::IoError(err.to_string()));
                break;
            }
        }
    }
}
