use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the tsserver-backed engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The server process could not be started.
    #[error("failed to start `{command}`")]
    Spawn {
        /// The program that was launched.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// No `tsserver.js` was configured or found.
    #[error(
        "could not find node_modules/typescript/lib/tsserver.js above {}; set {} to its path",
        .searched.display(),
        crate::locate::TSSERVER_ENV
    )]
    TsServerNotFound {
        /// The first directory searched.
        searched: PathBuf,
    },
    /// Reading from or writing to the server failed.
    #[error("tsserver I/O error")]
    Io(#[from] io::Error),
    /// The server sent something the client could not interpret.
    #[error("unexpected tsserver message: {0}")]
    Protocol(String),
    /// The server rejected a request.
    #[error("tsserver `{command}` failed: {message}")]
    Request {
        /// The rejected command.
        command: String,
        /// The server's error text.
        message: String,
    },
    /// The server went away before answering.
    #[error("tsserver exited unexpectedly")]
    Exited,
}
