//! Buffer input.

use std::io::{self, Read};
use thiserror::Error;

/// Failure to read the buffer.
#[derive(Debug, Error)]
pub enum InputError {
    /// The stream could not be read.
    #[error("failed to read buffer: {0}")]
    Read(#[from] io::Error),
}

/// Read `reader` to the end and return its contents as text.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD; the buffer is still checked.
pub fn read_buffer<R: Read>(mut reader: R) -> Result<String, InputError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}
