#![warn(missing_docs)]
//! `tsc-stdin-tsserver` - a [`tsc_stdin_core::Engine`] backed by TypeScript's `tsserver`.
//!
//! This crate contains the tsserver stdio framing, a small blocking client built on two pipe
//! threads, typed protocol messages, and the engine that turns one program build into one
//! short-lived server session.

pub mod client;
pub mod engine;
mod error;
pub mod locate;
pub mod protocol;
pub mod transport;

pub use client::{Inbound, Outbound, TsServerClient};
pub use engine::{ProjectSession, TsServerEngine};
pub use error::EngineError;
pub use locate::{EngineSettings, NODE_ENV, TSSERVER_ENV, find_tsserver};
pub use protocol::{DiagnosticWithLinePosition, Event, Location, Request, Response, ServerMessage};
pub use transport::{frame_message, read_message, write_request};
